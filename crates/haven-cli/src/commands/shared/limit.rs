/// Effective limit: the global `--limit` flag, else the configured default.
#[must_use]
pub fn effective_limit(global: Option<u32>, fallback: u32) -> u32 {
    global.filter(|n| *n > 0).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::effective_limit;

    #[test]
    fn flag_takes_precedence() {
        assert_eq!(effective_limit(Some(5), 20), 5);
    }

    #[test]
    fn zero_falls_back() {
        assert_eq!(effective_limit(Some(0), 20), 20);
        assert_eq!(effective_limit(None, 20), 20);
    }
}
