use std::str::FromStr;
use std::time::Duration;
use anyhow::Result;
use clap::ArgMatches;

pub fn opt<T: FromStr>(arg: Option<&str>) -> Result<Option<T>> {
    Ok(arg.map(|s| T::from_str(s).map_err(|_| invalid(s))).transpose()?)
}

pub fn duration(args: &ArgMatches, name: &str) -> Result<Option<Duration>> {
    Ok(args.value_of(name).map(|s| {
        humantime::parse_duration(s).map_err(|_| invalid(s))
    }).transpose()?)
}

pub fn list(args: &ArgMatches, name: &str) -> Vec<String> {
    args.values_of(name).map(|vs| {
        vs.flat_map(|v| v.split(',')).map(str::trim).filter(|v| !v.is_empty()).map(String::from).collect()
    }).unwrap_or_default()
}

fn invalid(value: &str) -> clap::Error {
    let msg  = format!("invalid argument value '{}'", value);
    let kind = clap::ErrorKind::InvalidValue;
    clap::Error::with_description(&msg, kind)
}

#[cfg(test)]
mod test {
    use std::time::Duration;
    use clap::{App, Arg};
    use super::*;

    fn app() -> App<'static, 'static> {
        App::new("test")
            .arg(Arg::with_name("timeout").long("timeout").takes_value(true))
            .arg(Arg::with_name("port").long("port").takes_value(true))
            .arg(Arg::with_name("brokers").long("brokers").takes_value(true).multiple(true))
    }

    #[test]
    fn parse_values() -> Result<()> {
        let args = app().get_matches_from(vec!["test", "--timeout", "1m 30s", "--port", "9999", "--brokers", "a:1,b:2", "--brokers", "c:3"]);

        assert_eq!(Some(Duration::from_secs(90)), duration(&args, "timeout")?);
        assert_eq!(Some(9999u16), opt(args.value_of("port"))?);
        assert_eq!(vec!["a:1", "b:2", "c:3"], list(&args, "brokers"));

        Ok(())
    }

    #[test]
    fn reject_invalid_values() {
        let args = app().get_matches_from(vec!["test", "--timeout", "soon", "--port", "99999"]);

        assert!(duration(&args, "timeout").is_err());
        assert!(opt::<u16>(args.value_of("port")).is_err());
        assert_eq!(None, duration(&app().get_matches_from(vec!["test"]), "timeout").unwrap());
    }
}
