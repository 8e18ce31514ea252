use serde::Deserialize;
use url::Url;

/// Configuration for the document store holding uploaded CDL files.
#[derive(Debug, Deserialize)]
pub struct Storage {
    /// Base URL of the storage service.
    ///
    /// **Environment variables**:
    /// - `DRIVER_LEADS_STORAGE_ENDPOINT`
    pub endpoint: Url,
    /// Private bucket where CDL documents live. The bucket must not
    /// allow public reads; every download goes through a signed URL.
    ///
    /// **Environment variables**:
    /// - `DRIVER_LEADS_STORAGE_BUCKET`
    #[serde(default = "Storage::default_bucket")]
    pub bucket: String,
    /// Service credential authorized to upload into and sign URLs
    /// for the private bucket.
    ///
    /// **Environment variables**:
    /// - `DRIVER_LEADS_STORAGE_SERVICE_KEY`
    pub service_key: String,
    /// Lifetime of issued document links, in seconds. Long enough for
    /// a browser to initiate the transfer, short enough that a leaked
    /// link is low-risk.
    ///
    /// **Environment variables**:
    /// - `DRIVER_LEADS_STORAGE_SIGNED_URL_TTL_SECS`
    #[serde(default = "Storage::default_signed_url_ttl_secs")]
    pub signed_url_ttl_secs: u64,
}

impl Storage {
    fn default_bucket() -> String {
        "cdl-files".to_string()
    }

    const fn default_signed_url_ttl_secs() -> u64 {
        60
    }
}
