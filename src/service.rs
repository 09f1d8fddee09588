use chrono::Datelike;
use reqwest::Client;

use crate::{
    config::Config,
    dto::{SendEmailRequest, SendEmailResponse},
    mail::{MailDispatcher, MailError},
    template::{TemplateContext, TemplateError, TemplateRenderer},
};

pub const PASSWORD_RESET_TEMPLATE: &str = "password-reset";
pub const RECIPIENT_NAME: &str = "Icaro";

pub struct EmailService {
    renderer: TemplateRenderer,
    dispatcher: MailDispatcher,
}

#[derive(Debug, thiserror::Error)]
pub enum EmailServiceError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Mail(#[from] MailError),
}

impl EmailService {
    pub fn new(config: &Config) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: &Config, client: Client) -> Self {
        Self {
            renderer: TemplateRenderer::new(&config.template_dir),
            dispatcher: MailDispatcher::new(config, client),
        }
    }

    pub async fn send_password_reset(
        &self,
        request: SendEmailRequest,
    ) -> Result<SendEmailResponse, EmailServiceError> {
        let context = TemplateContext {
            name: RECIPIENT_NAME.to_string(),
            reset_link: request.reset_link,
            year: chrono::Local::now().year(),
        };

        let html_body = self.renderer.render(PASSWORD_RESET_TEMPLATE, &context)?;

        let response = self
            .dispatcher
            .send(&request.subject, &html_body, &request.to)
            .await?;

        Ok(response)
    }
}
