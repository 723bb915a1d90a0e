use crate::core::StickySyncError;

/// Extracts the recency timestamp from a StickyStudy study-data payload.
///
/// The payload looks like `[1671149661_3_5...]`: a pair of enclosing delimiter
/// characters around underscore-separated fields, the first of which is a Unix
/// timestamp. An empty payload means the card has never been studied, which is
/// reported as `Ok(None)` rather than an error.
pub fn parse_timestamp(study_data: &str) -> Result<Option<i64>, StickySyncError> {
    if study_data.is_empty() {
        return Ok(None);
    }

    // Strip the enclosing delimiters, whatever they are.
    let mut inner = study_data.chars();
    inner.next();
    inner.next_back();

    let first_segment = inner.as_str().split('_').next().unwrap_or("");
    first_segment
        .parse::<i64>()
        .map(Some)
        .map_err(|_| StickySyncError::MalformedStudyData(study_data.to_string()))
}
