//! CLI commands

use anyhow::Result;
use clap::{Args, Subcommand};
use vetogest_cli::{Banner, CustomerForm, LoginForm};
use vetogest_core::Customer;
use vetogest_http::AuthSession;

const LOGIN_REQUIRED_MESSAGE: &str =
    "Veuillez vous connecter: vetogest login --email <email> --password <mot de passe>";

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the token pair
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Forget the stored tokens
    Logout,

    /// Show whether a session is stored
    Status,

    /// Customer records
    Customer {
        #[command(subcommand)]
        command: CustomerCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum CustomerCommands {
    /// Create a customer
    Create(CustomerArgs),
}

/// Form fields; missing ones are reported by validation
#[derive(Args, Debug)]
pub struct CustomerArgs {
    #[arg(long, default_value = "")]
    last_name: String,
    #[arg(long, default_value = "")]
    first_name: String,
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long = "phone", default_value = "")]
    phone_number: String,
    #[arg(long, default_value = "")]
    street: String,
    #[arg(long, default_value = "")]
    zip_code: String,
    #[arg(long, default_value = "")]
    city: String,
    #[arg(long)]
    description: Option<String>,
}

impl From<CustomerArgs> for Customer {
    fn from(args: CustomerArgs) -> Self {
        Customer {
            last_name: args.last_name,
            first_name: args.first_name,
            email: args.email,
            phone_number: args.phone_number,
            street: args.street,
            zip_code: args.zip_code,
            city: args.city,
            description: args.description,
            ..Default::default()
        }
    }
}

/// Run a command against the session and return the banner to show
pub async fn run(command: Commands, session: &AuthSession) -> Result<Banner> {
    let banner = match command {
        Commands::Login { email, password } => {
            LoginForm::new(email, password).submit(session).await
        }
        Commands::Logout => {
            session.logout()?;
            Banner::success("Déconnecté.")
        }
        Commands::Status => {
            if session.is_authenticated() {
                Banner::success("Connecté.")
            } else {
                Banner::error("Non connecté.")
            }
        }
        Commands::Customer {
            command: CustomerCommands::Create(args),
        } => {
            // Same gate as the web shell: the customer page needs a session
            if session.is_authenticated() {
                CustomerForm::new(args.into()).submit(session).await
            } else {
                Banner::error(LOGIN_REQUIRED_MESSAGE)
            }
        }
    };
    Ok(banner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vetogest_core::TokenPair;
    use vetogest_http::{TokenStore, VetoClient};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_args() -> CustomerArgs {
        CustomerArgs {
            last_name: "Durand".into(),
            first_name: "Paul".into(),
            email: "paul@example.com".into(),
            phone_number: "0478123456".into(),
            street: "12 rue Victor Hugo".into(),
            zip_code: "69002".into(),
            city: "Lyon".into(),
            description: None,
        }
    }

    fn session(base_url: String, tokens: TokenStore) -> AuthSession {
        AuthSession::new(VetoClient::builder().base_url(base_url).token_store(tokens)).unwrap()
    }

    #[tokio::test]
    async fn test_customer_create_requires_login() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/customers/"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&mock_server)
            .await;

        let session = session(mock_server.uri(), TokenStore::in_memory());
        let command = Commands::Customer {
            command: CustomerCommands::Create(create_args()),
        };

        let banner = run(command, &session).await.unwrap();
        assert_eq!(banner, Banner::error(LOGIN_REQUIRED_MESSAGE));
    }

    #[tokio::test]
    async fn test_status_and_logout() {
        let tokens = TokenStore::in_memory();
        tokens
            .set_tokens(&TokenPair {
                access: "A1".into(),
                refresh: "R1".into(),
            })
            .unwrap();
        let session = session("http://localhost:8000/api".to_string(), tokens.clone());

        assert!(run(Commands::Status, &session).await.unwrap().is_success());
        assert!(run(Commands::Logout, &session).await.unwrap().is_success());
        assert!(!run(Commands::Status, &session).await.unwrap().is_success());
        assert_eq!(tokens.refresh_token(), None);
    }
}
