//! The index page: upload form plus the list of stored files.

use crate::http::multipart::UPLOAD_FIELD;

pub fn render_index(names: &[String]) -> String {
    let items: String = names
        .iter()
        .map(|name| {
            let escaped = escape_html(name);
            format!("<li><a href=\"/{escaped}\">{escaped}</a></li>")
        })
        .collect();

    format!(
        "<html>\n\
         <head><title>File Server</title></head>\n\
         <body>\n\
         <h2>Upload File</h2>\n\
         <form action=\"/upload\" method=\"POST\" enctype=\"multipart/form-data\">\n\
         <input type=\"file\" name=\"{UPLOAD_FIELD}\"><br><br>\n\
         <input type=\"submit\" value=\"Upload\">\n\
         </form>\n\
         <hr>\n\
         <h2>File List</h2>\n\
         <ul>{items}</ul>\n\
         </body>\n\
         </html>\n"
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
