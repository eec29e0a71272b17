use crate::config::types::{
    CategoryEntry, Config, CrawlerConfig, OutputConfig, PageRange, SiteConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
///
/// A structural failure here aborts the run before any network activity.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_mode(config)?;
    validate_categories(&config.categories)?;
    if let Some(range) = &config.pages {
        validate_page_range(range)?;
    }
    Ok(())
}

/// Validates the target site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base-url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.albums_per_category < 1 {
        return Err(ConfigError::Validation(
            "albums-per-category must be >= 1".to_string(),
        ));
    }

    if config.max_pages_per_category < 1 {
        return Err(ConfigError::Validation(
            "max-pages-per-category must be >= 1".to_string(),
        ));
    }

    if config.images_per_album < 1 {
        return Err(ConfigError::Validation(
            "images-per-album must be >= 1".to_string(),
        ));
    }

    if config.enrich_concurrency < 1 || config.enrich_concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "enrich-concurrency must be between 1 and 100, got {}",
            config.enrich_concurrency
        )));
    }

    if config.max_concurrent_requests < 1 || config.max_concurrent_requests > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-requests must be between 1 and 100, got {}",
            config.max_concurrent_requests
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.scraper_name.is_empty() {
        return Err(ConfigError::Validation(
            "scraper-name cannot be empty".to_string(),
        ));
    }

    if !config
        .scraper_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "scraper-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.scraper_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.json_path.is_empty() {
        return Err(ConfigError::Validation(
            "json-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Enforces that exactly one crawl mode is configured
fn validate_mode(config: &Config) -> Result<(), ConfigError> {
    match (config.categories.is_empty(), config.pages.is_none()) {
        (true, true) => Err(ConfigError::Validation(
            "either [[category]] entries or a [pages] range must be configured".to_string(),
        )),
        (false, false) => Err(ConfigError::Validation(
            "[[category]] entries and a [pages] range are mutually exclusive".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Validates category entries
fn validate_categories(categories: &[CategoryEntry]) -> Result<(), ConfigError> {
    for entry in categories {
        if entry.id.is_empty() {
            return Err(ConfigError::Validation(
                "category id cannot be empty".to_string(),
            ));
        }

        if entry.name.is_empty() {
            return Err(ConfigError::Validation(format!(
                "category '{}' must have a display name",
                entry.id
            )));
        }

        let url = Url::parse(&entry.url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid URL for category '{}': {}", entry.id, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "category '{}' URL must use http or https",
                entry.id
            )));
        }
    }

    Ok(())
}

/// Validates the page range for single-gallery mode
fn validate_page_range(range: &PageRange) -> Result<(), ConfigError> {
    if range.start < 1 {
        return Err(ConfigError::Validation(format!(
            "pages.start must be >= 1, got {}",
            range.start
        )));
    }

    if range.end < range.start {
        return Err(ConfigError::Validation(format!(
            "pages.end ({}) must be >= pages.start ({})",
            range.end, range.start
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact-email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
