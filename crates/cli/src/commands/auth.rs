//! Login, signup, logout, and whoami.

use tracing::warn;

use orbitcart_client::ApiClient;
use orbitcart_core::Email;

use crate::store::LocalCartFile;
use crate::CliError;

/// Log in, then reconcile the local cart with the server cart.
pub async fn login(
    client: &ApiClient,
    cart_file: &LocalCartFile,
    email: &str,
    password: &str,
) -> Result<(), CliError> {
    let email = Email::parse(email)?;
    let user = client.login(&email, password).await?;
    println!("Logged in as {} (user {})", user.email, user.id);

    reconcile_cart(client, cart_file).await;
    Ok(())
}

/// Create an account, log in, and reconcile the local cart.
pub async fn signup(
    client: &ApiClient,
    cart_file: &LocalCartFile,
    name: &str,
    email: &str,
    password: &str,
) -> Result<(), CliError> {
    let email = Email::parse(email)?;
    let user = client.signup(name, &email, password).await?;
    println!("Account created; logged in as {}", user.email);

    reconcile_cart(client, cart_file).await;
    Ok(())
}

/// Reconcile the local cart after authentication.
///
/// The session is already stored at this point, so a cart failure must not
/// fail the command; it is logged and left for the next `cart sync`.
async fn reconcile_cart(client: &ApiClient, cart_file: &LocalCartFile) {
    match client.sync_cart_on_login(&cart_file.load()).await {
        Ok(merged) => {
            if let Err(err) = cart_file.save(&merged) {
                warn!(error = %err, "could not persist reconciled cart");
            } else if !merged.is_empty() {
                println!("Cart reconciled: {} item(s)", merged.len());
            }
        }
        Err(err) => {
            warn!(error = %err, "cart reconciliation failed after login");
            println!("Cart sync failed; run 'orbitcart cart sync' to retry");
        }
    }
}

/// Log out and clear the stored session.
pub async fn logout(client: &ApiClient) {
    client.logout().await;
    println!("Logged out");
}

/// Show the logged-in account.
pub async fn whoami(client: &ApiClient) -> Result<(), CliError> {
    let user = client.current_user().await?;
    println!("{} (user {})", user.email, user.id);
    if let Some(name) = user.name {
        println!("Name: {name}");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::FileSession;
    use orbitcart_client::models::LocalCartItem;
    use orbitcart_client::session::{SessionStore, TokenSet};
    use orbitcart_client::ClientConfig;

    // A loopback port with no listener: connections are refused immediately.
    fn refused_port() -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    #[tokio::test]
    async fn test_reconcile_survives_unreachable_backend() {
        let dir = tempfile::tempdir().unwrap();
        let session = Arc::new(FileSession::new(dir.path()));
        session.store(TokenSet::new("access", "refresh", "sess-1"));

        let url = format!("http://127.0.0.1:{}/", refused_port());
        let client = ApiClient::new(ClientConfig::new(url.parse().unwrap()), session.clone())
            .unwrap();
        let cart_file = LocalCartFile::new(dir.path());
        cart_file.save(&[LocalCartItem::new("1", 2)]).unwrap();

        reconcile_cart(&client, &cart_file).await;

        // The stored session and local cart are untouched by the failure.
        assert!(session.load().is_some());
        assert_eq!(cart_file.load(), vec![LocalCartItem::new("1", 2)]);
    }
}
