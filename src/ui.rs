//! Server-rendered prediction form.

use crate::assembler::InferenceContext;
use crate::encoders::CategoricalEncoder;
use crate::models::{CustomerRecord, PredictionResult};

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Customer Churn Prediction</title>
    <style>
        body { font-family: sans-serif; margin: 2rem auto; max-width: 960px; padding: 0 1rem; }
        .grid { display: grid; grid-template-columns: repeat(3, 1fr); gap: 1rem 2rem; }
        label { display: block; font-weight: 600; margin-bottom: 0.25rem; }
        input, select { width: 100%; padding: 0.4rem; box-sizing: border-box; }
        button { margin-top: 1.5rem; width: 100%; padding: 0.75rem; font-size: 1rem; }
        .metric { font-size: 2rem; font-weight: 700; }
        .churn { background: #fdecea; color: #8a1c1c; padding: 1rem; }
        .stay { background: #e8f5e9; color: #1b5e20; padding: 1rem; }
    </style>
</head>
<body>
    <h1>Customer Churn Prediction</h1>
    <p>Predict whether a customer is likely to churn based on demographic and financial details.</p>
    <h2>Enter Customer Details</h2>
"#;

const PAGE_TAIL: &str = "</body>\n</html>\n";

/// Renders the form, pre-filled with `record`, and the result panel when a
/// prediction is available.
pub fn render_page(
    context: &InferenceContext,
    record: &CustomerRecord,
    result: Option<&PredictionResult>,
) -> String {
    let mut html = String::with_capacity(8 * 1024);
    html.push_str(PAGE_HEAD);
    html.push_str(&render_form(context, record));
    html.push_str("<hr>\n");
    if let Some(result) = result {
        html.push_str(&render_result(result));
    }
    html.push_str(PAGE_TAIL);
    html
}

fn render_form(context: &InferenceContext, record: &CustomerRecord) -> String {
    let mut form = String::new();
    form.push_str("<form method=\"post\" action=\"/predict\">\n<div class=\"grid\">\n");

    // column 1
    select(
        &mut form,
        "Geography",
        "Geography",
        context.geography_encoder().categories(),
        &record.geography,
    );
    select(
        &mut form,
        "Gender",
        "Gender",
        context.gender_encoder().categories(),
        &record.gender,
    );
    number(&mut form, "Age", "Age", record.age, 18, 92);

    // column 2
    number(&mut form, "CreditScore", "Credit Score", record.credit_score, 0, 1000);
    number(&mut form, "Tenure", "Tenure (Years)", record.tenure, 0, 10);
    number(
        &mut form,
        "NumOfProducts",
        "Number of Products",
        record.num_of_products,
        1,
        4,
    );

    // column 3
    amount(&mut form, "Balance", "Balance", record.balance);
    amount(
        &mut form,
        "EstimatedSalary",
        "Estimated Salary",
        record.estimated_salary,
    );
    flag(&mut form, "HasCrCard", "Has Credit Card", record.has_cr_card);
    flag(&mut form, "IsActiveMember", "Active Member", record.is_active_member);

    form.push_str("</div>\n<button type=\"submit\">Predict Churn</button>\n</form>\n");
    form
}

fn render_result(result: &PredictionResult) -> String {
    let class = if result.will_churn { "churn" } else { "stay" };
    format!(
        "<h2>Prediction Results</h2>\n\
         <div>Churn Probability</div>\n\
         <div class=\"metric\">{}</div>\n\
         <p class=\"{}\"><strong>{}</strong></p>\n",
        result.display_probability(),
        class,
        result.message()
    )
}

fn select(out: &mut String, name: &str, label: &str, options: &[String], selected: &str) {
    out.push_str(&format!(
        "<div><label for=\"{name}\">{label}</label>\n<select id=\"{name}\" name=\"{name}\">\n"
    ));
    for option in options {
        let escaped = escape(option);
        let mark = if option == selected { " selected" } else { "" };
        out.push_str(&format!(
            "<option value=\"{escaped}\"{mark}>{escaped}</option>\n"
        ));
    }
    out.push_str("</select></div>\n");
}

fn number(out: &mut String, name: &str, label: &str, value: u32, min: u32, max: u32) {
    out.push_str(&format!(
        "<div><label for=\"{name}\">{label}</label>\
         <input id=\"{name}\" name=\"{name}\" type=\"number\" min=\"{min}\" max=\"{max}\" step=\"1\" value=\"{value}\" required></div>\n"
    ));
}

fn amount(out: &mut String, name: &str, label: &str, value: f64) {
    out.push_str(&format!(
        "<div><label for=\"{name}\">{label}</label>\
         <input id=\"{name}\" name=\"{name}\" type=\"number\" min=\"0\" step=\"0.01\" value=\"{value:.2}\" required></div>\n"
    ));
}

fn flag(out: &mut String, name: &str, label: &str, value: u8) {
    let options = ["0".to_string(), "1".to_string()];
    select(out, name, label, &options, &value.to_string());
}

/// Minimal HTML escaping for attribute and text content.
fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
        assert_eq!(escape("France"), "France");
    }

    #[test]
    fn test_select_marks_current_option() {
        let mut out = String::new();
        let options = vec!["France".to_string(), "Spain".to_string()];
        select(&mut out, "Geography", "Geography", &options, "Spain");

        assert!(out.contains("<option value=\"Spain\" selected>Spain</option>"));
        assert!(out.contains("<option value=\"France\">France</option>"));
    }

    #[test]
    fn test_inputs_render_one_line_each() {
        let mut out = String::new();
        number(&mut out, "Age", "Age", 30, 18, 92);
        amount(&mut out, "Balance", "Balance", 12.5);

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("min=\"18\" max=\"92\" step=\"1\" value=\"30\""));
        assert!(lines[1].contains("name=\"Balance\""));
        assert!(lines[1].contains("value=\"12.50\""));
    }

    #[test]
    fn test_result_panel_messages() {
        let stay = render_result(&PredictionResult::from_probability(0.5).unwrap());
        assert!(stay.contains("0.50"));
        assert!(stay.contains("The customer is not likely to churn."));

        let churn = render_result(&PredictionResult::from_probability(0.91).unwrap());
        assert!(churn.contains("class=\"churn\""));
        assert!(churn.contains("The customer is likely to churn."));
    }
}
