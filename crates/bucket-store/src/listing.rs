/// Separator between key segments in the bucket.
pub const DELIMITER: char = '/';

/// Drop directory markers from a raw prefix listing.
///
/// A marker is either the prefix itself or any key ending in the delimiter.
/// The prefix comparison ignores trailing delimiters, since `object_store`
/// paths drop them: an S3 marker `albums/x/` is listed as `albums/x`.
/// Ordering of the remaining keys is preserved.
pub fn filter_listing<I, S>(prefix: &str, keys: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let marker = prefix.trim_end_matches(DELIMITER);
    keys.into_iter()
        .map(Into::into)
        .filter(|key| !key.ends_with(DELIMITER) && key.trim_end_matches(DELIMITER) != marker)
        .collect()
}
