use aws_sdk_sesv2::types::{Body as EmailBody, Content, Destination, EmailContent, Message};
use aws_sdk_sesv2::Client as SesClient;

/// Send the invitation email with the accept link
pub async fn send_invite_email(
    ses_client: &SesClient,
    from_address: &str,
    to_address: &str,
    household_name: &str,
    accept_url: &str,
) -> Result<(), String> {
    let subject = Content::builder()
        .data(format!("You have been invited to join {}", household_name))
        .build()
        .map_err(|e| format!("SES content build error: {}", e))?;

    let html = Content::builder()
        .data(format!(
            "<p>You have been invited to join the household <strong>{}</strong>.</p>\
             <p><a href=\"{}\">Accept the invitation</a></p>\
             <p>If you were not expecting this email, you can ignore it.</p>",
            household_name, accept_url
        ))
        .build()
        .map_err(|e| format!("SES content build error: {}", e))?;

    let message = Message::builder()
        .subject(subject)
        .body(EmailBody::builder().html(html).build())
        .build();

    let destination = Destination::builder().to_addresses(to_address).build();

    ses_client
        .send_email()
        .from_email_address(from_address)
        .destination(destination)
        .content(EmailContent::builder().simple(message).build())
        .send()
        .await
        .map_err(|e| format!("SES send_email error: {}", e))?;

    tracing::info!("Invite email sent to {}", to_address);
    Ok(())
}
