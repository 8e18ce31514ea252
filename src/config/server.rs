use error_stack::{Report, Result, ResultExt};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use url::Url;

use super::ParseError;

#[derive(Debug, Deserialize)]
pub struct Server {
    pub db: super::Database,
    pub payment: super::Payment,
    pub storage: super::Storage,
    /// Secret key used to sign and verify session tokens.
    ///
    /// **Environment variables**:
    /// - `DRIVER_LEADS_JWT_SECRET`
    pub jwt_secret: String,
    /// Public base URL of the site, used to build the success and
    /// cancel redirect targets handed to the payment gateway.
    ///
    /// **Environment variables**:
    /// - `DRIVER_LEADS_SITE_URL` or `SITE_URL`
    pub site_url: Url,
    #[serde(default = "Server::default_ip")]
    pub ip: IpAddr,
    #[serde(default = "Server::default_port")]
    pub port: u16,
}

impl Server {
    pub fn load() -> Result<Self, ParseError> {
        dotenvy::dotenv().ok();

        let config = Self::figment()
            .extract::<Self>()
            .map_err(|e| Report::new(ParseError).attach_printable(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ParseError> {
        if self.jwt_secret.len() < 12 || self.jwt_secret.len() > 1024 {
            return Err(Report::new(ParseError).attach_printable("Invalid JWT secret key"));
        }

        if self.payment.secret_key.is_empty() || self.payment.price_id.is_empty() {
            return Err(Report::new(ParseError)
                .attach_printable("Payment gateway is not configured (secret key and price id)"));
        }

        if self.payment.webhook_secret.is_empty() {
            return Err(
                Report::new(ParseError).attach_printable("Webhook signing secret is not set")
            );
        }

        if self.storage.bucket.is_empty() {
            return Err(Report::new(ParseError).attach_printable("Storage bucket must be named"));
        }

        Url::parse(&format!("http://host/{}", self.storage.bucket))
            .change_context(ParseError)
            .attach_printable("Storage bucket name is not URL-safe")?;

        Ok(())
    }

    const fn default_ip() -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
    }

    const fn default_port() -> u16 {
        8080
    }
}

impl Server {
    const DEFAULT_CONFIG_FILE: &'static str = "driver-leads.yml";

    /// Creates a default [`Figment`](figment::Figment) object to load
    /// server configuration. This function is there for implementing
    /// [`Server::load`] and testing.
    pub(crate) fn figment() -> figment::Figment {
        use figment::{
            providers::{Env, Format, Yaml},
            Figment,
        };

        Figment::new()
            .merge(Yaml::file(Self::DEFAULT_CONFIG_FILE))
            // One big con about figment (env provider to be specific) especially
            // these fields with underscore in it.
            .merge(
                Env::prefixed("DRIVER_LEADS_").map(|v| {
                    match v.as_str().to_ascii_uppercase().as_str() {
                        "DB_URL" => "db.url".into(),
                        "DB_POOL_SIZE" => "db.pool_size".into(),
                        "DB_TIMEOUT_SECS" => "db.timeout_secs".into(),

                        "PAYMENT_SECRET_KEY" => "payment.secret_key".into(),
                        "PAYMENT_PRICE_ID" => "payment.price_id".into(),
                        "PAYMENT_WEBHOOK_SECRET" => "payment.webhook_secret".into(),

                        "STORAGE_ENDPOINT" => "storage.endpoint".into(),
                        "STORAGE_BUCKET" => "storage.bucket".into(),
                        "STORAGE_SERVICE_KEY" => "storage.service_key".into(),
                        "STORAGE_SIGNED_URL_TTL_SECS" => "storage.signed_url_ttl_secs".into(),

                        "JWT_SECRET" => "jwt_secret".into(),
                        "SITE_URL" => "site_url".into(),

                        _ => v.as_str().replace('_', ".").into(),
                    }
                }),
            )
            // Environment variable aliases
            .merge(Env::raw().map(|v| match v.as_str().to_ascii_uppercase().as_str() {
                "DATABASE_URL" => "db.url".into(),
                "SITE_URL" => "site_url".into(),
                "STRIPE_SECRET_KEY" => "payment.secret_key".into(),
                "STRIPE_PRICE_ID" => "payment.price_id".into(),
                "STRIPE_WEBHOOK_SECRET" => "payment.webhook_secret".into(),
                _ => v.into(),
            }))
    }

    /// Loads the server test configuration.
    #[cfg(test)]
    #[must_use]
    pub fn for_tests() -> Self {
        Self {
            db: super::Database {
                url: "postgres://localhost/driver_leads_test".into(),
                pool_size: std::num::NonZeroU32::new(1).unwrap(),
                timeout_secs: std::num::NonZeroU64::new(5).unwrap(),
            },
            payment: super::Payment {
                secret_key: "sk_test_xxx".into(),
                price_id: "price_test_unlock".into(),
                webhook_secret: "whsec_test123secret456".into(),
            },
            storage: super::Storage {
                endpoint: Url::parse("http://localhost:54321/storage/v1").unwrap(),
                bucket: "cdl-files".into(),
                service_key: "service-test-key".into(),
                signed_url_ttl_secs: 60,
            },
            jwt_secret: "test-jwt-secret-0123456789".into(),
            site_url: Url::parse("http://localhost:3000").unwrap(),
            ip: Self::default_ip(),
            port: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use std::num::{NonZeroU32, NonZeroU64};

    #[test]
    fn env_aliases() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "postgres://db/leads");
            jail.set_env("DRIVER_LEADS_DB_POOL_SIZE", "100");
            jail.set_env("DRIVER_LEADS_DB_TIMEOUT_SECS", "3030");

            jail.set_env("STRIPE_SECRET_KEY", "sk_live_abc");
            jail.set_env("STRIPE_PRICE_ID", "price_123");
            jail.set_env("STRIPE_WEBHOOK_SECRET", "whsec_123");

            jail.set_env("DRIVER_LEADS_STORAGE_ENDPOINT", "http://storage.local/v1");
            jail.set_env("DRIVER_LEADS_STORAGE_SERVICE_KEY", "svc");

            jail.set_env("DRIVER_LEADS_JWT_SECRET", "super-secret-key");
            jail.set_env("SITE_URL", "https://driverleads.example.com");

            let config: Server = Server::figment().extract()?;
            assert_eq!(config.db.url, "postgres://db/leads");
            assert_eq!(config.db.pool_size, NonZeroU32::new(100).unwrap());
            assert_eq!(config.db.timeout_secs, NonZeroU64::new(3030).unwrap());

            assert_eq!(config.payment.secret_key, "sk_live_abc");
            assert_eq!(config.payment.price_id, "price_123");
            assert_eq!(config.payment.webhook_secret, "whsec_123");

            assert_eq!(config.storage.endpoint.as_str(), "http://storage.local/v1");
            assert_eq!(config.storage.bucket, "cdl-files");
            assert_eq!(config.storage.signed_url_ttl_secs, 60);

            assert_eq!(config.jwt_secret, "super-secret-key");
            assert_eq!(
                config.site_url.as_str(),
                "https://driverleads.example.com/"
            );
            assert_eq!(config.port, 8080);

            Ok(())
        });
    }

    // `Env::raw` aliases are merged last, so the conventional names win.
    #[test]
    fn database_url_alias_wins() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "postgres://alias/db");
            jail.set_env("DRIVER_LEADS_DB_URL", "postgres://primary/db");

            jail.set_env("STRIPE_SECRET_KEY", "sk_alias");
            jail.set_env("STRIPE_PRICE_ID", "price_alias");
            jail.set_env("STRIPE_WEBHOOK_SECRET", "whsec_alias");
            jail.set_env("DRIVER_LEADS_STORAGE_ENDPOINT", "http://storage.local/v1");
            jail.set_env("DRIVER_LEADS_STORAGE_SERVICE_KEY", "svc");
            jail.set_env("DRIVER_LEADS_JWT_SECRET", "super-secret-key");
            jail.set_env("SITE_URL", "https://driverleads.example.com");

            let config: Server = Server::figment().extract()?;
            assert_eq!(config.db.url, "postgres://alias/db");

            Ok(())
        });
    }

    #[test]
    fn rejects_short_jwt_secret() {
        let mut config = Server::for_tests();
        config.jwt_secret = "short".into();
        assert!(config.validate().is_err());
    }
}
