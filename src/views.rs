//! Bare HTML pages for both apps. Every interpolated value goes through
//! [`escape`].

use std::fmt::Write;

use axum::response::Html;

use crate::{
    flash::{Flash, Level},
    models::{Ticket, User, TICKET_AMOUNT},
    uploads::{total_size, StoredFile, ALLOWED_EXTENSIONS, MAX_UPLOAD_BYTES},
};

pub const CATEGORIES: [&str; 3] = ["bike", "scooter", "car"];

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

fn page(title: &str, flash: Option<&Flash>, body: &str) -> Html<String> {
    let notice = flash
        .map(|flash| {
            let class = match flash.level {
                Level::Success => "flash success",
                Level::Error => "flash error",
            };
            format!("<p class=\"{class}\">{}</p>", escape(&flash.message))
        })
        .unwrap_or_default();

    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n<h1>{title}</h1>\n{notice}\n{body}\n</body>\n</html>\n",
        title = escape(title),
    ))
}

// File manager

pub fn file_index(flash: Option<&Flash>, files: &[StoredFile]) -> Html<String> {
    let body = format!(
        "<p>{} files stored, {} in total.</p>\n<p><a href=\"/upload\">Upload a file</a> | <a href=\"/files\">Browse files</a></p>",
        files.len(),
        format_size(total_size(files)),
    );
    page("Cloud File Storage", flash, &body)
}

pub fn upload_form(flash: Option<&Flash>) -> Html<String> {
    let body = format!(
        "<form method=\"post\" action=\"/upload\" enctype=\"multipart/form-data\">\n<input type=\"file\" name=\"file\">\n<button type=\"submit\">Upload</button>\n</form>\n<p>Allowed: {}. Max {}.</p>",
        ALLOWED_EXTENSIONS.join(", "),
        format_size(MAX_UPLOAD_BYTES as u64),
    );
    page("Upload", flash, &body)
}

pub fn file_list(flash: Option<&Flash>, files: &[StoredFile]) -> Html<String> {
    let mut body = String::new();
    if files.is_empty() {
        body.push_str("<p>No files uploaded yet.</p>");
    } else {
        body.push_str("<table>\n<tr><th>Name</th><th>Size</th><th>Uploaded</th><th></th></tr>\n");
        for file in files {
            let link = escape(&urlencoding::encode(&file.name));
            let _ = writeln!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td><a href=\"/download/{link}\">Download</a> <a href=\"/delete/{link}\">Delete</a></td></tr>",
                escape(&file.display_name),
                format_size(file.size),
                file.created.format("%Y-%m-%d %H:%M:%S"),
            );
        }
        body.push_str("</table>");
    }
    body.push_str("\n<p><a href=\"/upload\">Upload another</a></p>");
    page("Files", flash, &body)
}

// Park rental

pub fn login(flash: Option<&Flash>) -> Html<String> {
    let mut body = String::from("<form method=\"post\" action=\"/\">\n");
    for field in ["name", "mobile", "gender", "aadhaar", "license", "location"] {
        let _ = writeln!(
            body,
            "<label>{field} <input type=\"text\" name=\"{field}\" required></label><br>"
        );
    }
    body.push_str("<button type=\"submit\">Continue</button>\n</form>");
    page("Park Rental Login", flash, &body)
}

fn payment_select() -> &'static str {
    "<select name=\"payment\"><option>UPI</option><option>Card</option><option>Cash</option></select>"
}

pub fn ticket(flash: Option<&Flash>, user: Option<&User>) -> Html<String> {
    let greeting = user
        .map(|user| format!("<p>Welcome, {}.</p>\n", escape(&user.name)))
        .unwrap_or_default();
    let body = format!(
        "{greeting}<p>Park entry ticket: Rs {TICKET_AMOUNT}</p>\n<form method=\"post\">\n{}\n<button type=\"submit\">Pay</button>\n</form>",
        payment_select(),
    );
    page("Entry Ticket", flash, &body)
}

pub fn categories(user_id: i64, tickets: &[Ticket]) -> Html<String> {
    let mut body = String::new();
    if let Some(ticket) = tickets.last() {
        let _ = writeln!(
            body,
            "<p>Ticket #{}: {} via {}</p>",
            ticket.id,
            escape(&ticket.status),
            escape(&ticket.payment_mode),
        );
    }
    body.push_str("<ul>\n");
    for category in CATEGORIES {
        let _ = writeln!(
            body,
            "<li><a href=\"/vehicles/{user_id}/{category}\">{category}</a></li>"
        );
    }
    body.push_str("</ul>");
    page("Choose a Category", None, &body)
}

pub fn vehicles(flash: Option<&Flash>, category: &str) -> Html<String> {
    let body = format!(
        "<p>Category: {}</p>\n<form method=\"post\">\n<label>Vehicle <input type=\"text\" name=\"vehicle\" required></label><br>\n<label>Duration <input type=\"text\" name=\"duration\" required></label><br>\n<label>Cost <input type=\"number\" name=\"cost\" min=\"0\" required></label><br>\n<button type=\"submit\">Continue</button>\n</form>",
        escape(category),
    );
    page("Choose a Vehicle", flash, &body)
}

pub fn payment(flash: Option<&Flash>, vehicle: &str, duration: &str, cost: i64) -> Html<String> {
    let body = format!(
        "<p>{} for {}: Rs {cost}</p>\n<form method=\"post\">\n{}\n<button type=\"submit\">Pay</button>\n</form>",
        escape(vehicle),
        escape(duration),
        payment_select(),
    );
    page("Payment", flash, &body)
}

pub fn safety() -> Html<String> {
    page(
        "Safety Guidelines",
        None,
        "<ul>\n<li>Wear a helmet at all times.</li>\n<li>Keep to the marked park lanes.</li>\n<li>Return the vehicle before your slot ends.</li>\n</ul>\n<p><a href=\"/thankyou\">I understand</a></p>",
    )
}

pub fn thankyou() -> Html<String> {
    page(
        "Thank You",
        None,
        "<p>Your booking is confirmed. Enjoy the ride!</p>\n<p><a href=\"/\">Start over</a></p>",
    )
}
