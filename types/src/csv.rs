//! RFC 4180 CSV encoding for exports.

/// A row type with a fixed header list.
pub trait CsvRecord {
    const HEADERS: &'static [&'static str];

    /// One value per header, in header order.
    fn fields(&self) -> Vec<String>;
}

/// Encode `records` with a header row. Every record ends with CRLF.
pub fn encode<R: CsvRecord>(records: &[R]) -> String {
    let mut out = String::new();
    write_record(&mut out, R::HEADERS.iter().copied());
    for record in records {
        write_record(&mut out, record.fields().iter().map(String::as_str));
    }
    out
}

pub fn write_record<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_field(out, field);
    }
    out.push_str("\r\n");
}

fn write_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\r', '\n']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row(&'static str, &'static str);

    impl CsvRecord for Row {
        const HEADERS: &'static [&'static str] = &["Name", "Notes"];

        fn fields(&self) -> Vec<String> {
            vec![self.0.to_string(), self.1.to_string()]
        }
    }

    #[test]
    fn plain_fields_are_bare() {
        assert_eq!(encode(&[Row("Jane", "ok")]), "Name,Notes\r\nJane,ok\r\n");
    }

    #[test]
    fn quotes_special_characters() {
        let csv = encode(&[
            Row("Doe, Jane", "said \"hi\""),
            Row("Multi", "line\nvalue"),
            Row("Carriage", "a\rb"),
        ]);
        assert_eq!(
            csv,
            "Name,Notes\r\n\
             \"Doe, Jane\",\"said \"\"hi\"\"\"\r\n\
             Multi,\"line\nvalue\"\r\n\
             Carriage,\"a\rb\"\r\n"
        );
    }

    #[test]
    fn empty_export_is_just_headers() {
        assert_eq!(encode::<Row>(&[]), "Name,Notes\r\n");
    }

    #[test]
    fn empty_fields_stay_empty() {
        assert_eq!(encode(&[Row("", "")]), "Name,Notes\r\n,\r\n");
    }
}
