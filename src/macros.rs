/// Creates or modifies a `std::process::Command` adding args.
///
/// # Examples
/// ```
/// use container_publish::cmd;
///
/// let mut command = cmd!("echo", "Hello world!");
/// cmd!(command, "And goodbye.");
/// command.status().unwrap();
/// ```
#[macro_export]
macro_rules! cmd {
    ($command:literal) => {
        {
            ::std::process::Command::new($command)
        }
    };
    ($command:literal, $($arg:expr),+ $(,)?) => {
        {
            let mut c = cmd!($command);
            c$(.arg($arg))*;
            c
        }
    };
    ($command:ident, $($arg:expr),+ $(,)?) => {
        {
            $command$(.arg($arg))*;
        }
    };
}

/// Creates a `Vec<String>` from a list of `Into<String>` values.
#[macro_export]
macro_rules! string_vec {
    ($($string:expr),* $(,)?) => {
        vec![$(::std::string::String::from($string),)*]
    };
}
