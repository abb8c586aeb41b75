/// Extracts the status code from the first line of a raw HTTP/1.x response.
pub(crate) fn parse_status_line(raw: &[u8]) -> Option<u16> {
    let line_end = raw.windows(2).position(|window| window == b"\r\n")?;
    let line = std::str::from_utf8(&raw[..line_end]).ok()?;
    let mut parts = line.split_whitespace();
    let version = parts.next()?;
    if !version.starts_with("HTTP/") {
        return None;
    }
    let code = parts.next()?;
    if code.len() != 3 {
        return None;
    }
    code.parse::<u16>()
        .ok()
        .filter(|code| (100..=599).contains(code))
}
