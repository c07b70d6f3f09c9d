use spread_model::csv::parse_csv;

#[test]
fn test_three_rows_with_all_headers() {
    let text = "用户ID,身份标签,精准地域\nU1,媒体,北京\nU2,个人,上海\nU3,机构,广州\n";
    let rows = parse_csv(text);
    assert_eq!(rows.len(), 3);
    for row in &rows {
        assert_eq!(row.len(), 3);
        assert!(row.contains_key("用户ID"));
        assert!(row.contains_key("身份标签"));
        assert!(row.contains_key("精准地域"));
    }
    assert_eq!(rows[1]["精准地域"], "上海");
}

#[test]
fn test_short_row_fills_empty_strings() {
    let rows = parse_csv("a,b,c\n1,2,3\n4\n5,6,7");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1]["a"], "4");
    assert_eq!(rows[1]["b"], "");
    assert_eq!(rows[1]["c"], "");
}

#[test]
fn test_blank_lines_skipped_and_values_trimmed() {
    let rows = parse_csv(" id , name \r\n\r\n  7 ,  x  \r\n   \n8,y");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], "7");
    assert_eq!(rows[0]["name"], "x");
    assert_eq!(rows[1]["name"], "y");
}

#[test]
fn test_extra_fields_ignored() {
    let rows = parse_csv("a,b\n1,2,3,4");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].len(), 2);
    assert_eq!(rows[0]["b"], "2");
}

#[test]
fn test_quoted_comma_is_not_special() {
    // Known limitation: quoting is not supported.
    let rows = parse_csv("a,b\n\"x,y\",z");
    assert_eq!(rows[0]["a"], "\"x");
    assert_eq!(rows[0]["b"], "y\"");
}

#[test]
fn test_empty_input() {
    assert!(parse_csv("").is_empty());
    assert!(parse_csv("a,b\n").is_empty());
}

#[test]
fn test_leading_byte_order_mark_ignored() {
    let rows = parse_csv("\u{feff}用户ID,身份标签,精准地域\nU1,媒体,北京\n");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["用户ID"], "U1");
    assert_eq!(rows[0]["精准地域"], "北京");
}
