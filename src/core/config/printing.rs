use crate::core::config::data::Config;

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        match &self.backend_url {
            Some(url) => println!("  backend-url: {url}"),
            None => println!("  backend-url: (unset)"),
        }
        match &self.default_provider {
            Some(provider) => println!("  default-provider: {provider}"),
            None => println!("  default-provider: (unset)"),
        }
    }
}
