use std::env;

use rocket::figment::Figment;

pub const PORT_ENV: &str = "PORT";
pub const DEFAULT_PORT: u16 = 8080;

/// Rocket's own configuration with the listening socket taken from `PORT`.
pub fn figment() -> Figment {
    let port = port_from(env::var(PORT_ENV).ok().as_deref());
    rocket::Config::figment()
        .merge(("address", "0.0.0.0"))
        .merge(("port", port))
}

fn port_from(value: Option<&str>) -> u16 {
    match value.map(str::parse::<u16>) {
        Some(Ok(port)) => port,
        Some(Err(e)) => {
            eprintln!("Ignoring invalid {PORT_ENV} value: {e}. Using {DEFAULT_PORT}.");
            DEFAULT_PORT
        }
        None => DEFAULT_PORT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_defaults_when_unset_or_invalid() {
        assert_eq!(port_from(None), DEFAULT_PORT);
        assert_eq!(port_from(Some("not-a-port")), DEFAULT_PORT);
        assert_eq!(port_from(Some("70000")), DEFAULT_PORT);
    }

    #[test]
    fn port_is_read_from_value() {
        assert_eq!(port_from(Some("3000")), 3000);
    }
}
