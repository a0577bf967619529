//! Login flow for the pari.ru account.

use anyhow::{bail, Context, Result};
use chromiumoxide::page::Page;
use std::time::Duration;
use tracing::info;

use super::browser::{wait_for_element, wait_for_url};
use super::{ACCOUNT_URL_MARKER, LOGIN_URL};
use crate::config::AppConfig;

const LOGIN_INPUT: &str = "input[data-testid=\"input\"][name=\"login\"]";
const PASSWORD_INPUT: &str = "input[data-testid=\"input\"][type=\"password\"]";

/// Text of the login submit button
const SUBMIT_LABEL: &str = "Войти";

/// Log in with the configured credentials. Succeeds once the URL carries the
/// account marker; any earlier failure (field missing, submit not found,
/// postcondition timeout) is returned for the caller's fallback handling.
pub async fn login(page: &Page, cfg: &AppConfig) -> Result<()> {
    if cfg.auth.login.is_empty() || cfg.auth.password.is_empty() {
        bail!("Missing credentials: set PARI_AUTH_LOGIN and PARI_AUTH_PASSWORD");
    }

    info!("Logging in at {}", LOGIN_URL);
    page.goto(LOGIN_URL).await.context("Opening login page")?;

    let timeout = Duration::from_secs(cfg.scraper.wait_timeout_secs);

    let login_field = wait_for_element(page, LOGIN_INPUT, timeout).await?;
    fill_field(page, LOGIN_INPUT, &login_field, &cfg.auth.login).await?;
    tokio::time::sleep(Duration::from_secs(1)).await;

    let password_field = page
        .find_element(PASSWORD_INPUT)
        .await
        .context("Password field not found")?;
    fill_field(page, PASSWORD_INPUT, &password_field, &cfg.auth.password).await?;
    tokio::time::sleep(Duration::from_secs(1)).await;

    submit(page).await?;

    wait_for_url(page, ACCOUNT_URL_MARKER, timeout)
        .await
        .context("No redirect to the account area after login")?;
    info!("Login succeeded");
    Ok(())
}

/// Clear an input and type the value into it.
async fn fill_field(
    page: &Page,
    css: &str,
    field: &chromiumoxide::element::Element,
    value: &str,
) -> Result<()> {
    page.evaluate(format!(
        "(() => {{ const el = document.querySelector({}); if (el) el.value = ''; }})()",
        serde_json::to_string(css)?
    ))
    .await?;
    field.click().await?;
    field.type_str(value).await?;
    Ok(())
}

/// Find the submit span by its label, scroll it into view and click it
/// through the DOM. The page re-renders the button with hashed classes, so
/// matching on the visible text is the stable option.
async fn submit(page: &Page) -> Result<()> {
    let clicked: bool = page
        .evaluate(format!(
            r#"(() => {{
                const span = [...document.querySelectorAll('span')]
                    .find(el => el.textContent.trim() === {label});
                if (!span) return false;
                span.scrollIntoView({{ behavior: 'smooth', block: 'center' }});
                span.click();
                return true;
            }})()"#,
            label = serde_json::to_string(SUBMIT_LABEL)?
        ))
        .await?
        .into_value()?;

    if !clicked {
        bail!("Login submit button not found");
    }
    Ok(())
}
