use super::error::CatalogError;

const STOCK_OPEN: &str = "<INSTOCKVALUE>";
const STOCK_CLOSE: &str = "</INSTOCKVALUE>";

/// Pull the stock-status token out of a record's `DATAPAYLOAD` markup.
pub fn extract_stock_status(payload: &str) -> Result<&str, CatalogError> {
    let start = payload
        .find(STOCK_OPEN)
        .map(|i| i + STOCK_OPEN.len())
        .ok_or(CatalogError::MalformedPayload { marker: STOCK_OPEN })?;
    let rest = &payload[start..];
    let end = rest
        .find(STOCK_CLOSE)
        .ok_or(CatalogError::MalformedPayload { marker: STOCK_CLOSE })?;
    Ok(&rest[..end])
}
