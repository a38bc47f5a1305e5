//! Resolver configuration.
//!
//! [`ResolvConf`] collects the servers to query and the options that
//! shape a resolution: the per-attempt timeout, the number of attempts
//! per server, and the overall deadline. It can parse a glibc-style
//! configuration file, commonly known as `/etc/resolv.conf`.
//!
//! The [`ServerSource`] trait is how the resolver obtains its server
//! list. It is asked afresh on every resolution, so a source that
//! re-reads the configuration file makes configuration changes take
//! effect without a restart.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::SplitWhitespace;
use std::time::Duration;
use std::{convert, error, fmt, fs, io, str};
use tracing::debug;

//------------ ResolvOptions -------------------------------------------------

/// Options for the resolver configuration.
#[derive(Clone, Debug)]
pub struct ResolvOptions {
    /// Timeout to wait for a response to a single query.
    pub timeout: Duration,

    /// Number of query attempts per server before moving on.
    pub attempts: usize,

    /// Overall deadline for a complete resolution.
    ///
    /// This covers everything: all servers, all retries, and every hop
    /// of a CNAME chain.
    pub resolve_timeout: Duration,
}

impl Default for ResolvOptions {
    fn default() -> Self {
        ResolvOptions {
            timeout: Duration::from_millis(500),
            attempts: 5,
            resolve_timeout: Duration::from_secs(5),
        }
    }
}

//------------ ResolvConf ----------------------------------------------------

/// Resolver configuration.
///
/// The type follows the builder pattern: after creating a value with
/// [`ResolvConf::new`] you can manipulate the members, possibly by
/// parsing a configuration file into them, and then call
/// [`finalize`][Self::finalize] to make the configuration valid. The
/// easiest way to get the system configuration is through
/// [`ResolvConf::system`], which parses the system's configuration file
/// or falls back to a default if that fails.
#[derive(Clone, Debug)]
pub struct ResolvConf {
    /// Addresses of servers to query, in the order to try them.
    pub servers: Vec<SocketAddr>,

    /// Default options.
    pub options: ResolvOptions,
}

/// # Management
///
impl ResolvConf {
    /// Creates a new, empty configuration.
    ///
    /// Using an empty configuration will fail since it does not contain
    /// any name servers. Call [`finalize`][Self::finalize] to make it
    /// usable.
    pub fn new() -> Self {
        ResolvConf {
            servers: Vec::new(),
            options: ResolvOptions::default(),
        }
    }

    /// Finalizes the configuration for actual use.
    ///
    /// If `servers` is empty, adds `127.0.0.1:53`. This is exactly what
    /// glibc does.
    pub fn finalize(&mut self) {
        if self.servers.is_empty() {
            self.servers.push(SocketAddr::new(
                IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
                53,
            ));
        }
    }

    /// Creates a configuration from the system's configuration file.
    ///
    /// This currently only works for Unix-y systems.
    pub fn system() -> Self {
        let mut res = ResolvConf::new();
        let _ = res.parse_file("/etc/resolv.conf");
        res.finalize();
        res
    }
}

/// # Parsing Configuration File
///
impl ResolvConf {
    /// Parses the configuration from a file.
    pub fn parse_file<P: AsRef<Path>>(
        &mut self,
        path: P,
    ) -> Result<(), Error> {
        let mut file = fs::File::open(path)?;
        self.parse(&mut file)
    }

    /// Parses the configuration from a reader.
    ///
    /// The format is that of the `/etc/resolv.conf` file.
    pub fn parse<R: io::Read>(
        &mut self,
        reader: &mut R,
    ) -> Result<(), Error> {
        use std::io::BufRead;

        for line in io::BufReader::new(reader).lines() {
            let line = line?;
            let line = line.trim_end();

            if line.is_empty()
                || line.starts_with(';')
                || line.starts_with('#')
            {
                continue;
            }

            let mut words = line.split_whitespace();
            match words.next() {
                Some("nameserver") => self.parse_nameserver(words)?,
                // Search path handling is not implemented; only
                // absolute names are looked up.
                Some("domain") | Some("search") | Some("sortlist") => {}
                Some("options") => self.parse_options(words)?,
                _ => return Err(Error::ParseError),
            }
        }
        Ok(())
    }

    /// Parses a `nameserver` line.
    fn parse_nameserver(
        &mut self,
        mut words: SplitWhitespace,
    ) -> Result<(), Error> {
        let addr = next_word(&mut words)?
            .parse::<IpAddr>()
            .map_err(|_| Error::ParseError)?;
        self.servers.push(SocketAddr::new(addr, 53));
        no_more_words(words)
    }

    /// Parses an `options` line.
    fn parse_options(
        &mut self,
        words: SplitWhitespace,
    ) -> Result<(), Error> {
        for word in words {
            match split_arg(word)? {
                ("timeout", Some(n)) => {
                    self.options.timeout = Duration::from_secs(n as u64)
                }
                ("attempts", Some(n)) => self.options.attempts = n,
                // Ignore unknown or misformated options.
                _ => {}
            }
        }
        Ok(())
    }
}

//--- Default

impl Default for ResolvConf {
    fn default() -> Self {
        Self::new()
    }
}

//--- Display

impl fmt::Display for ResolvConf {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for server in &self.servers {
            f.write_str("nameserver ")?;
            if server.port() == 53 {
                writeln!(f, "{}", server.ip())?;
            } else {
                writeln!(f, "{}", server)?;
            }
        }
        writeln!(
            f,
            "options timeout:{} attempts:{}",
            self.options.timeout.as_secs(),
            self.options.attempts
        )
    }
}

//------------ ServerSource --------------------------------------------------

/// A source for the list of servers to query.
///
/// The resolver asks its source afresh on every top-level resolution,
/// so changes in the underlying configuration take effect without a
/// restart.
pub trait ServerSource: Send + Sync + 'static {
    /// Returns the addresses of the servers to query, in order.
    fn nameservers(&self) -> Vec<SocketAddr>;
}

impl ServerSource for ResolvConf {
    fn nameservers(&self) -> Vec<SocketAddr> {
        self.servers.clone()
    }
}

//------------ SystemConf ----------------------------------------------------

/// The system's resolver configuration file as a server source.
///
/// Re-reads the file on every request.
#[derive(Clone, Debug)]
pub struct SystemConf {
    /// The path of the configuration file.
    path: PathBuf,
}

impl SystemConf {
    /// Creates a source reading the default `/etc/resolv.conf`.
    pub fn new() -> Self {
        Self::with_path("/etc/resolv.conf")
    }

    /// Creates a source reading the given path.
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        SystemConf { path: path.into() }
    }
}

impl Default for SystemConf {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerSource for SystemConf {
    fn nameservers(&self) -> Vec<SocketAddr> {
        let mut conf = ResolvConf::new();
        if let Err(err) = conf.parse_file(&self.path) {
            debug!(
                "failed to read {}: {}",
                self.path.display(),
                err
            );
        }
        conf.finalize();
        conf.servers
    }
}

//------------ Private Helpers -----------------------------------------------
//
// These are here to wrap stuff into Results.

/// Returns a reference to the next word or an error.
fn next_word<'a>(
    words: &'a mut str::SplitWhitespace,
) -> Result<&'a str, Error> {
    match words.next() {
        Some(word) => Ok(word),
        None => Err(Error::ParseError),
    }
}

/// Returns nothing but errors out if there are words left.
fn no_more_words(mut words: str::SplitWhitespace) -> Result<(), Error> {
    match words.next() {
        Some(..) => Err(Error::ParseError),
        None => Ok(()),
    }
}

/// Splits the name and argument from an option with arguments.
///
/// These options consist of a name followed by a colon followed by a
/// value, which so far is only `usize`, so we do that.
fn split_arg(s: &str) -> Result<(&str, Option<usize>), Error> {
    match s.find(':') {
        Some(idx) => {
            let (left, right) = s.split_at(idx);
            Ok((left, Some(right[1..].parse()?)))
        }
        None => Ok((s, None)),
    }
}

//------------ Error ---------------------------------------------------------

/// The error that can happen when parsing `resolv.conf`.
#[derive(Debug)]
pub enum Error {
    /// The file is not a proper file.
    ParseError,

    /// Something happened while reading.
    Io(io::Error),
}

impl convert::From<io::Error> for Error {
    fn from(error: io::Error) -> Error {
        Error::Io(error)
    }
}

impl convert::From<std::num::ParseIntError> for Error {
    fn from(_: std::num::ParseIntError) -> Error {
        Error::ParseError
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::ParseError => {
                f.write_str("error parsing configuration")
            }
            Error::Io(ref err) => err.fmt(f),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::ParseError => None,
            Error::Io(ref err) => Some(err),
        }
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use std::io;

    #[test]
    fn parse_resolv_conf() {
        let mut conf = ResolvConf::new();
        let data = "# comment\n\
                    ; another comment\n\
                    nameserver 192.0.2.0\n\
                    nameserver 2001:db8::1\n\
                    search example.com\n\
                    options timeout:2 attempts:3 ndots:1\n"
            .to_string();
        assert!(conf.parse(&mut io::Cursor::new(data)).is_ok());
        assert_eq!(
            conf.servers,
            [
                SocketAddr::new("192.0.2.0".parse().unwrap(), 53),
                SocketAddr::new("2001:db8::1".parse().unwrap(), 53),
            ]
        );
        assert_eq!(conf.options.timeout, Duration::from_secs(2));
        assert_eq!(conf.options.attempts, 3);
    }

    #[test]
    fn parse_garbage_fails() {
        let mut conf = ResolvConf::new();
        let data = "nonsense line\n".to_string();
        assert!(conf.parse(&mut io::Cursor::new(data)).is_err());
    }

    #[test]
    fn finalize_adds_localhost() {
        let mut conf = ResolvConf::new();
        conf.finalize();
        assert_eq!(
            conf.servers,
            [SocketAddr::new(
                IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
                53
            )]
        );
    }
}
