//! Transactional email adapter.
//!
//! Templates are rendered to [`OutgoingEmail`] values and handed to a
//! [`Mailer`]. The production mailer talks to the Brevo HTTP API.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::{
    config::MailConfig,
    error::{Error, Result},
};

/// A rendered message ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Summary of a new participant for the admin alert.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantSummary {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<()>;
}

pub type SharedMailer = Arc<dyn Mailer>;

#[derive(Serialize)]
struct Contact<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailRequest<'a> {
    sender: Contact<'a>,
    to: Vec<Contact<'a>>,
    subject: &'a str,
    html_content: &'a str,
}

/// [`Mailer`] backed by the Brevo transactional email API.
pub struct BrevoMailer {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    from_email: String,
    from_name: String,
}

impl BrevoMailer {
    pub fn new(config: &MailConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build mail client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            from_email: config.from_email.clone(),
            from_name: config.from_name.clone(),
        })
    }
}

#[async_trait]
impl Mailer for BrevoMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        let request = SendEmailRequest {
            sender: Contact {
                email: &self.from_email,
                name: Some(&self.from_name),
            },
            to: vec![Contact {
                email: &email.to,
                name: None,
            }],
            subject: &email.subject,
            html_content: &email.html,
        };

        let response = self
            .client
            .post(format!("{}/smtp/email", self.base_url))
            .header("api-key", self.api_key.expose_secret())
            .header("accept", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Mail(format!("Mail request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Mail(format!("Mail provider returned {}: {}", status, body)));
        }

        tracing::info!(to = %email.to, subject = %email.subject, "Email sent");
        Ok(())
    }
}

/// Escapes the characters that would let user input alter the markup.
fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
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

fn branded_layout(brand: &str, body: &str) -> String {
    format!(
        r#"<html>
<body style="font-family:Arial;background:#f7f3ed;margin:0;padding:0;">
  <div style="max-width:600px;margin:auto;background:#fff;border-radius:10px;overflow:hidden;">
    <div style="background:#1F4D3E;color:#fff;padding:25px;text-align:center;">
      <h2 style="margin:0;">{brand}</h2>
    </div>
    <div style="padding:25px;color:#333;">
{body}
    </div>
    <div style="background:#eee;text-align:center;padding:15px;font-size:13px;color:#666;">
      &copy; {year} {brand}
    </div>
  </div>
</body>
</html>"#,
        brand = brand,
        body = body,
        year = Utc::now().year(),
    )
}

/// Participation received.
pub fn confirmation_email(to: &str, first_name: &str, last_name: &str) -> OutgoingEmail {
    let body = format!(
        "      <h3>Bonjour {} {}</h3>\n      \
         <p>Merci pour votre participation ! Nous avons bien reçu votre inscription.</p>\n      \
         <p>Nous vous contacterons bientôt.</p>\n      \
         <p style=\"margin-top:30px;\">Cordialement,<br>L'équipe Bambou</p>",
        escape_html(first_name),
        escape_html(last_name),
    );

    OutgoingEmail {
        to: to.to_string(),
        subject: "Merci pour votre participation".to_string(),
        html: branded_layout("Bambou Glow Up", &body),
    }
}

/// Quote request received.
pub fn quote_acknowledgement_email(to: &str, first_name: &str, last_name: &str) -> OutgoingEmail {
    let body = format!(
        "      <h3>Bonjour {} {},</h3>\n      \
         <p>Nous avons bien reçu votre demande de devis.</p>\n      \
         <p>Notre équipe vous répondra très prochainement avec une offre personnalisée.</p>\n      \
         <p style=\"margin-top:30px;\">Merci pour votre confiance<br>L'équipe Bambou</p>",
        escape_html(first_name),
        escape_html(last_name),
    );

    OutgoingEmail {
        to: to.to_string(),
        subject: "Votre demande de devis est bien reçue".to_string(),
        html: branded_layout("Bambou Esthétique", &body),
    }
}

/// New participation alert for the admin mailbox.
pub fn admin_notification_email(admin_email: &str, participant: &ParticipantSummary) -> OutgoingEmail {
    let phone = participant
        .phone
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .map(escape_html)
        .unwrap_or_else(|| "Non renseigné".to_string());

    let html = format!(
        r#"<html>
<body style="font-family:Arial;background:#fff;">
  <div style="max-width:600px;margin:auto;padding:20px;">
    <h2 style="background:#1F4D3E;color:#fff;padding:15px;text-align:center;">Nouvelle Participation</h2>
    <p><strong>Nom :</strong> {first} {last}</p>
    <p><strong>Email :</strong> {email}</p>
    <p><strong>Téléphone :</strong> {phone}</p>
    <p><strong>Date :</strong> {date}</p>
  </div>
</body>
</html>"#,
        first = escape_html(&participant.first_name),
        last = escape_html(&participant.last_name),
        email = escape_html(&participant.email),
        phone = phone,
        date = participant.submitted_at.format("%d/%m/%Y %H:%M:%S"),
    );

    OutgoingEmail {
        to: admin_email.to_string(),
        subject: format!(
            "Nouvelle participation - {} {}",
            participant.first_name, participant.last_name
        ),
        html,
    }
}
