use super::*;
use crate::param::ParamList;

fn patch(json: &str) -> PropertiesPatch {
    PropertiesPatch::from_json_slice(json.as_bytes()).unwrap()
}

fn number(n: i64) -> SqlValue {
    SqlValue::Number(n.into())
}

fn px(n: i64) -> Dimension {
    Dimension::Number(n.into())
}

#[test]
fn test_single_field() {
    let built = patch(r#"{"margin_top": 10}"#).build(ComponentId(7)).unwrap();
    assert_eq!(
        built.sql,
        "UPDATE properties SET margin_top = $1 WHERE component_id = $2 RETURNING *"
    );
    assert_eq!(built.params.values(), &[number(10), SqlValue::Int(7)]);
}

#[test]
fn test_null_becomes_auto() {
    let built = patch(r#"{"margin_top": null, "padding_left": 5}"#)
        .build(ComponentId(3))
        .unwrap();
    assert_eq!(
        built.sql,
        "UPDATE properties SET margin_top = $1, padding_left = $2 WHERE component_id = $3 RETURNING *"
    );
    assert_eq!(
        built.params.values(),
        &[SqlValue::text(AUTO), number(5), SqlValue::Int(3)]
    );
}

#[test]
fn test_empty_patch_is_rejected() {
    let p = patch("{}");
    assert!(p.is_empty());
    assert!(p.assignments().is_empty());
    assert!(matches!(
        p.build(ComponentId(1)),
        Err(PropsError::NoFieldsSpecified)
    ));
}

#[test]
fn test_empty_body_is_empty_patch() {
    assert!(patch("").is_empty());
    assert!(patch("  \n").is_empty());
}

#[test]
fn test_unknown_fields_are_ignored() {
    let p = patch(r#"{"color": "red", "padding_top": "1rem"}"#);
    assert_eq!(
        p.assignments(),
        vec![(Column::PaddingTop, SqlValue::text("1rem"))]
    );
}

#[test]
fn test_only_unknown_fields_is_empty() {
    let p = patch(r#"{"width": 100}"#);
    assert!(matches!(
        p.build(ComponentId(1)),
        Err(PropsError::NoFieldsSpecified)
    ));
}

#[test]
fn test_canonical_order_ignores_body_order() {
    let p = patch(r#"{"padding_right": 4, "margin_left": 2, "padding_top": 3, "margin_top": 1}"#);
    let columns: Vec<Column> = p.assignments().into_iter().map(|(c, _)| c).collect();
    assert_eq!(
        columns,
        vec![
            Column::MarginTop,
            Column::MarginLeft,
            Column::PaddingTop,
            Column::PaddingRight,
        ]
    );
    assert_eq!(
        p.build(ComponentId(9)).unwrap().sql,
        "UPDATE properties SET margin_top = $1, margin_left = $2, padding_top = $3, padding_right = $4 WHERE component_id = $5 RETURNING *"
    );
}

#[test]
fn test_every_subset_numbers_placeholders_in_order() {
    for mask in 1u32..(1 << Column::ALL.len()) {
        let mut p = PropertiesPatch::new();
        let mut expected = Vec::new();
        for (bit, column) in Column::ALL.iter().enumerate() {
            if mask & (1 << bit) != 0 {
                p = p.set(*column, px(bit as i64));
                expected.push(*column);
            }
        }

        let built = p.build(ComponentId(42)).unwrap();
        let fragments: Vec<String> = expected
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{} = ${}", c, i + 1))
            .collect();
        assert_eq!(
            built.sql,
            format!(
                "UPDATE properties SET {} WHERE component_id = ${} RETURNING *",
                fragments.join(", "),
                expected.len() + 1
            )
        );
        assert_eq!(built.params.len(), expected.len() + 1);
        assert_eq!(built.params.values().last(), Some(&SqlValue::Int(42)));
    }
}

#[test]
fn test_concrete_values_bound_unchanged() {
    let p = PropertiesPatch::new()
        .set(Column::MarginBottom, Dimension::Text("12px".into()))
        .set(Column::PaddingBottom, px(0))
        .clear(Column::PaddingRight);
    assert_eq!(
        p.assignments(),
        vec![
            (Column::MarginBottom, SqlValue::text("12px")),
            (Column::PaddingBottom, number(0)),
            (Column::PaddingRight, SqlValue::text(AUTO)),
        ]
    );
}

#[test]
fn test_fractional_number_kept() {
    let p = patch(r#"{"margin_right": 2.5}"#);
    let n = serde_json::Number::from_f64(2.5).unwrap();
    assert_eq!(
        p.assignments(),
        vec![(Column::MarginRight, SqlValue::Number(n))]
    );
}

#[test]
fn test_build_is_repeatable() {
    let p = patch(r#"{"margin_top": null, "padding_bottom": 8}"#);
    let first = p.build(ComponentId(5)).unwrap();
    let second = p.build(ComponentId(5)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_invalid_value_types_rejected() {
    for body in [
        r#"{"margin_top": true}"#,
        r#"{"margin_top": [1]}"#,
        r#"{"margin_top": {"px": 1}}"#,
    ] {
        let err = PropertiesPatch::from_json_slice(body.as_bytes()).unwrap_err();
        assert!(matches!(err, PropsError::InvalidBody(_)), "{body}: {err}");
    }
}

#[test]
fn test_non_object_body_rejected() {
    for body in ["[]", "42", "\"margin_top\"", "null", "{not json"] {
        let err = PropertiesPatch::from_json_slice(body.as_bytes()).unwrap_err();
        assert!(matches!(err, PropsError::InvalidBody(_)), "{body}: {err}");
    }
}

#[test]
fn test_component_id_parsing() {
    assert_eq!("12".parse::<ComponentId>().unwrap(), ComponentId(12));
    assert_eq!(" 12 ".parse::<ComponentId>().unwrap(), ComponentId(12));
    assert_eq!("-3".parse::<ComponentId>().unwrap().get(), -3);

    for raw in ["", "abc", "1.5", "12abc", "99999999999999999999"] {
        assert!(matches!(
            raw.parse::<ComponentId>(),
            Err(PropsError::InvalidIdentifier(_))
        ));
    }
}

#[test]
fn test_param_list_matches_sql_placeholders() {
    let built = patch(r#"{"margin_left": 1, "margin_right": 2}"#)
        .build(ComponentId(1))
        .unwrap();
    let expected: ParamList = [number(1), number(2), SqlValue::Int(1)].into_iter().collect();
    assert_eq!(built.params, expected);
}
