//! HTML for the form, result and error pages.

use axum::http::StatusCode;

use crate::validation::TargetDigit;

const STYLE: &str = "body{font-family:sans-serif;max-width:40rem;margin:3rem auto;text-align:center}\
img{max-width:100%;image-rendering:pixelated}.error{color:#b00020}";

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n"
    )
}

pub fn form_page() -> String {
    layout(
        "Digit generator",
        "<h1>Handwritten digit generator</h1>\n\
         <form method=\"post\" action=\"/\">\n\
         <label for=\"targetDigit\">Digit (0-9):</label>\n\
         <input type=\"text\" id=\"targetDigit\" name=\"targetDigit\" autofocus>\n\
         <button type=\"submit\">Generate</button>\n\
         </form>",
    )
}

pub fn result_page(digit: TargetDigit, image_url: &str, cache_token: u32) -> String {
    let src = format!("{image_url}?v={cache_token}");
    layout(
        &format!("Generated {digit}"),
        &format!(
            "<h1>Generated digit {digit}</h1>\n\
             <img src=\"{}\" alt=\"Grid of generated {digit} digits\">\n\
             <p><a href=\"/generate/{digit}\">Generate again</a> | <a href=\"/\">Back</a></p>",
            escape_html(&src)
        ),
    )
}

pub fn error_page(message: &str) -> String {
    layout(
        "Error",
        &format!(
            "<h1>Error</h1>\n<p class=\"error\">{}</p>\n<p><a href=\"/\">Try again</a></p>",
            escape_html(message)
        ),
    )
}

pub fn failure_page(status: StatusCode) -> String {
    let reason = status.canonical_reason().unwrap_or("Error");
    layout(
        reason,
        &format!(
            "<h1>{} {reason}</h1>\n<p>The digit grid could not be generated.</p>\n\
             <p><a href=\"/\">Back</a></p>",
            status.as_u16()
        ),
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
