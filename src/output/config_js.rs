//! The generated `config.js` with the region to ping URL map.

use crate::error::OutputError;
use crate::models::Address;
use handlebars::Handlebars;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const CONFIG_TEMPLATE_NAME: &str = "config_js";

const CONFIG_TEMPLATE: &str = "
var _URLS = {
{{#each this}}  \"{{region}}\": \"{{ip}}/ping\",
{{/each}}};
";

/// Render the sorted addresses into the config script.
pub fn render_config(addresses: &[Address]) -> Result<String, OutputError> {
    let mut hb = Handlebars::new();
    hb.set_strict_mode(true);
    hb.register_escape_fn(handlebars::no_escape);
    hb.register_template_string(CONFIG_TEMPLATE_NAME, CONFIG_TEMPLATE)?;
    Ok(hb.render(CONFIG_TEMPLATE_NAME, &addresses)?)
}

/// Write `rendered` to stdout and to `path`.
///
/// Both sinks are attempted even if the first one fails.
pub fn write_config(rendered: &str, path: &Path) -> Result<(), OutputError> {
    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    write_sinks(rendered, &mut stdout, path)
}

/// Write `rendered` to `console` and then to a freshly created file at `path`.
pub fn write_sinks<W: Write>(
    rendered: &str,
    console: &mut W,
    path: &Path,
) -> Result<(), OutputError> {
    let mut errors = Vec::new();

    if let Err(source) = console.write_all(rendered.as_bytes()).and_then(|_| console.flush()) {
        errors.push(OutputError::Write {
            sink: "stdout".to_string(),
            source,
        });
    }

    let to_file = File::create(path).and_then(|mut f| {
        f.write_all(rendered.as_bytes())?;
        f.flush()
    });
    match to_file {
        Ok(()) => log::info!("wrote {} bytes to {}", rendered.len(), path.display()),
        Err(source) => errors.push(OutputError::Write {
            sink: path.display().to_string(),
            source,
        }),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(OutputError::Sinks(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn sample() -> Vec<Address> {
        vec![
            Address::new("eu-storage", "https://storage.googleapis.com/gcping-eu"),
            Address::new("us-central1-cloudrun", "https://svc.example"),
            Address::new("us-east1", "http://1.2.3.4"),
        ]
    }

    #[test]
    fn test_render_exact_text() {
        let rendered = render_config(&sample()).unwrap();
        assert_eq!(
            rendered,
            concat!(
                "\nvar _URLS = {\n",
                "  \"eu-storage\": \"https://storage.googleapis.com/gcping-eu/ping\",\n",
                "  \"us-central1-cloudrun\": \"https://svc.example/ping\",\n",
                "  \"us-east1\": \"http://1.2.3.4/ping\",\n",
                "};\n",
            )
        );
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_config(&[]).unwrap(), "\nvar _URLS = {\n};\n");
    }

    #[test]
    fn test_render_is_deterministic() {
        let first = render_config(&sample()).unwrap();
        let second = render_config(&sample()).unwrap();
        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn test_render_keeps_duplicate_regions() {
        let rendered = render_config(&[
            Address::new("us-east1", "http://1.1.1.1"),
            Address::new("us-east1", "http://2.2.2.2"),
        ])
        .unwrap();
        assert!(rendered.contains("  \"us-east1\": \"http://1.1.1.1/ping\",\n"));
        assert!(rendered.contains("  \"us-east1\": \"http://2.2.2.2/ping\",\n"));
    }

    #[test]
    fn test_render_does_not_html_escape() {
        let rendered =
            render_config(&[Address::new("a", "https://x.example/?a=1&b=2")]).unwrap();
        assert!(rendered.contains("https://x.example/?a=1&b=2/ping"));
    }

    #[test]
    fn test_write_sinks_both() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.js");
        let mut console = Vec::new();
        write_sinks("var x;\n", &mut console, &path).unwrap();
        assert_eq!(console, b"var x;\n");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "var x;\n");
    }

    #[test]
    fn test_write_sinks_file_fails_console_still_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("config.js");
        let mut console = Vec::new();
        let err = write_sinks("var x;\n", &mut console, &path).unwrap_err();
        assert_eq!(console, b"var x;\n");
        match err {
            OutputError::Sinks(errors) => assert_eq!(errors.len(), 1),
            other => panic!("unexpected error {other:?}"),
        }
    }

    struct BrokenConsole;

    impl Write for BrokenConsole {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_sinks_console_fails_file_still_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.js");
        let err = write_sinks("var x;\n", &mut BrokenConsole, &path).unwrap_err();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "var x;\n");
        assert!(err.to_string().contains("write stdout"));
    }
}
