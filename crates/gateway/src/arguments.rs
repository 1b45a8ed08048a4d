use {
    shared::{arguments::LoggingArguments, http_client, oneinch_api::OneInchClient},
    std::net::SocketAddr,
    url::Url,
};

#[derive(clap::Parser)]
pub struct Arguments {
    #[clap(flatten)]
    pub logging: LoggingArguments,

    #[clap(flatten)]
    pub http_client: http_client::Arguments,

    #[clap(long, env, default_value = "0.0.0.0:3001")]
    pub bind_address: SocketAddr,

    /// Base URL of the 1inch developer API.
    #[clap(long, env, default_value = OneInchClient::DEFAULT_URL)]
    pub one_inch_url: Url,

    /// Bearer credential for the 1inch developer API.
    #[clap(long, env)]
    pub one_inch_api_key: String,

    /// Token list provider forwarded upstream when a request does not
    /// specify one.
    #[clap(long, env, default_value = "1inch")]
    pub default_provider: String,

    /// Country code forwarded upstream when a request does not specify one.
    #[clap(long, env, default_value = "US")]
    pub default_country: String,

    /// Chain id assumed for quote requests that do not specify one.
    #[clap(long, env, default_value = "1")]
    pub default_chain_id: u64,

    /// Origin of the front-end that is allowed to call this API across
    /// origins. Localhost development origins are always allowed.
    #[clap(long, env, default_value = "http://localhost:3000")]
    pub frontend_url: Url,
}

impl std::fmt::Display for Arguments {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let Arguments {
            logging,
            http_client,
            bind_address,
            one_inch_url,
            one_inch_api_key,
            default_provider,
            default_country,
            default_chain_id,
            frontend_url,
        } = self;

        write!(f, "{logging}")?;
        write!(f, "{http_client}")?;
        writeln!(f, "bind_address: {bind_address}")?;
        writeln!(f, "one_inch_url: {one_inch_url}")?;
        let _intentionally_ignored = one_inch_api_key;
        writeln!(f, "one_inch_api_key: SECRET")?;
        writeln!(f, "default_provider: {default_provider}")?;
        writeln!(f, "default_country: {default_country}")?;
        writeln!(f, "default_chain_id: {default_chain_id}")?;
        writeln!(f, "frontend_url: {frontend_url}")?;

        Ok(())
    }
}
