//! Public address discovery for the notification callback

/// Returns the host's public IP, as seen by the ipify echo service. Only
/// consulted at startup when no callback base was configured; the broker must
/// be able to reach the returned address for notifications to arrive.
pub async fn host_public_ip() -> Result<String, reqwest::Error> {
    let ip = reqwest::get("https://api.ipify.org")
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(ip.trim().to_string())
}
