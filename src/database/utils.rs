use regex::Regex;

/// Flattens a readable multi-line query and rewrites `?` placeholders into
/// the `$1..$n` form Postgres expects, in order of appearance.
pub fn sql(query: &str) -> String {
    let flattened = query.split_whitespace().collect::<Vec<&str>>().join(" ");
    let re = Regex::new(r"\?").unwrap();
    let mut n = 0;
    re.replace_all(&flattened, |_: &regex::Captures| {
        n += 1;
        format!("${}", n)
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numbers_placeholders_in_order() {
        let query = sql("SELECT * FROM t WHERE a = ?\n  AND b = ?  AND c = ?");
        assert_eq!(query, "SELECT * FROM t WHERE a = $1 AND b = $2 AND c = $3");
    }

    #[test]
    fn leaves_queries_without_placeholders_alone() {
        assert_eq!(sql("SELECT 1"), "SELECT 1");
    }
}
