#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use sdtmsg_client::config;
use sdtmsg_client::MessageContext;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
display:
  max_payload_bytez: 12 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.display.max_payload_bytes, 64);
    assert_eq!(cfg.display.max_string_chars, 128);
    assert_eq!(cfg.display.max_properties, 16);
    assert_eq!(cfg.display.max_total_chars, 1024);
}

#[test]
fn partial_display_section_keeps_other_defaults() {
    let cfg = config::load_from_str(
        r#"
version: 1
display:
  max_properties: 3
"#,
    )
    .unwrap();
    assert_eq!(cfg.display.max_properties, 3);
    assert_eq!(cfg.display.max_payload_bytes, 64);
}

#[test]
fn unsupported_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn out_of_range_limits_rejected() {
    for bad in [
        "version: 1\ndisplay: { max_payload_bytes: 0 }\n",
        "version: 1\ndisplay: { max_properties: 5000 }\n",
        "version: 1\ndisplay: { max_total_chars: 10 }\n",
        "version: 1\ndisplay: { max_string_chars: 512, max_total_chars: 256 }\n",
    ] {
        let err = config::load_from_str(bad).expect_err(bad);
        assert_eq!(err.code().as_str(), "BAD_REQUEST", "{bad}");
    }
}

#[test]
fn context_from_config_file() {
    let path = std::env::temp_dir().join(format!("sdtmsg-config-{}.yaml", std::process::id()));
    std::fs::write(&path, "version: 1\ndisplay:\n  max_total_chars: 200\n").unwrap();

    let ctx = MessageContext::from_config_file(path.to_str().unwrap()).unwrap();
    assert_eq!(ctx.config().display.max_total_chars, 200);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn missing_config_file_is_internal() {
    let err = MessageContext::from_config_file("/nonexistent/sdtmsg.yaml").unwrap_err();
    assert_eq!(err.code().as_str(), "INTERNAL");
}
