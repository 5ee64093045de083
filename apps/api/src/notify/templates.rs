//! HTML bodies for the two notification kinds. Every caller-supplied value
//! is escaped before it lands in markup.

use std::fmt::Write;

const NOT_PROVIDED: &str = "Not provided";

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn row(html: &mut String, label: &str, value: Option<&str>) {
    let value = value.map(escape_html);
    let _ = writeln!(
        html,
        "<p><strong>{label}:</strong> {}</p>",
        value.as_deref().unwrap_or(NOT_PROVIDED)
    );
}

#[derive(Debug, Clone, Default)]
pub struct ContactDetails<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub business_name: Option<&'a str>,
    pub phone_number: Option<&'a str>,
    pub how_can_we_help: Option<&'a str>,
    pub best_time_to_contact: Option<&'a str>,
    pub message: Option<&'a str>,
}

pub fn contact_subject(name: &str) -> String {
    format!("New Contact Form Submission from {name}")
}

pub fn contact_email(details: &ContactDetails<'_>) -> String {
    let mut html = String::from("<h3>New Contact Request</h3>\n");
    row(&mut html, "Name", Some(details.name));
    row(&mut html, "Email", Some(details.email));
    row(&mut html, "Business Name", details.business_name);
    row(&mut html, "Phone", details.phone_number);
    row(&mut html, "Topic", details.how_can_we_help);
    row(&mut html, "Best Time to Contact", details.best_time_to_contact);
    html.push_str("<p><strong>Message:</strong></p>\n");
    let message = details
        .message
        .map(|m| escape_html(m).replace('\n', "<br>"))
        .unwrap_or_else(|| NOT_PROVIDED.to_string());
    let _ = writeln!(html, "<p>{message}</p>");
    html
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationDetails<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub job_title: Option<&'a str>,
}

pub fn application_subject(job_title: Option<&str>, name: &str) -> String {
    format!(
        "New Job Application: {} - {name}",
        job_title.unwrap_or("General Application")
    )
}

pub fn application_email(details: &ApplicationDetails<'_>) -> String {
    let mut html = String::from("<h3>New Job Application</h3>\n");
    row(&mut html, "Job Title", details.job_title);
    row(&mut html, "Name", Some(details.name));
    row(&mut html, "Email", Some(details.email));
    row(&mut html, "Phone", details.phone);
    html.push_str("<p>The applicant's resume is attached.</p>\n");
    html
}
