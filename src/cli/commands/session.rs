//! Session Commands
//!
//! Usage:
//!   codelens login
//!   codelens logout
//!   codelens whoami

use crate::cli::{CommandContext, Output};
use crate::session::{ProfileSessionProvider, SessionProvider};
use crate::types::Result;

pub async fn login(session: &ProfileSessionProvider) -> Result<()> {
    session.start();
    session.sign_in().await?;

    if let Some(user) = session.current().user() {
        Output::new().success(&format!("Signed in as {}", user.label()));
    }
    Ok(())
}

pub async fn logout(session: &ProfileSessionProvider) -> Result<()> {
    session.start();
    session.sign_out().await;
    Output::new().success("Signed out");
    Ok(())
}

pub fn whoami(ctx: &CommandContext) -> Result<()> {
    let output = Output::new();
    let state = ctx.session.start();

    let Some(user) = state.user() else {
        output.info("Not signed in. Run 'codelens login'.");
        return Ok(());
    };

    let history = &ctx.history;
    println!("User:    {}", user.label());
    println!("UID:     {}", user.uid);
    if let Some(email) = &user.email {
        println!("Email:   {}", email);
    }
    if history.is_available() {
        println!("History: {} analyses", history.count(&user.uid));
    } else {
        println!("History: unavailable");
    }
    Ok(())
}
