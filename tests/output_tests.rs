use cfgcmd::emit::{self, to_config, to_json, to_json_pretty, to_yaml};
use cfgcmd::{Document, Node, Object, Options, OutputFormat, ParseOptions, Sink};
use proptest::prelude::*;

fn render(node: Option<&Node>, key: &str, options: Options) -> String {
    let mut sink = Sink::new(Vec::new(), options);
    sink.render(node, "", key).unwrap();
    sink.finish().unwrap();
    String::from_utf8(sink.into_inner()).unwrap()
}

fn text(node: &Node) -> String {
    render(Some(node), "", Options::default())
}

fn sample() -> Node {
    let mut inner = Object::new();
    inner.insert("port", Node::Integer(80));
    let mut obj = Object::new();
    obj.insert("name", Node::from("web"));
    obj.insert("server", Node::Object(inner));
    obj.insert("tags", Node::Array(vec![Node::from("a"), Node::from("b")]));
    Node::Object(obj)
}

#[test]
fn test_text_scalars() {
    assert_eq!(text(&Node::Integer(-3)), "-3\n");
    assert_eq!(text(&Node::Float(1.5)), "1.500000\n");
    assert_eq!(text(&Node::Timestamp(60.0)), "60.000000\n");
    assert_eq!(text(&Node::Boolean(false)), "false\n");
    assert_eq!(text(&Node::from("hi")), "\"hi\"\n");
    assert_eq!(text(&Node::Null), "null\n");
    assert_eq!(text(&Node::Userdata("p".into())), "{userdata}\n");
    assert_eq!(render(None, "", Options::default()), "null\n");
}

#[test]
fn test_text_placeholders() {
    assert_eq!(text(&Node::Array(vec![])), "[array]\n");
    assert_eq!(text(&Node::Object(Object::new())), "{object}\n");
}

#[test]
fn test_raw_strings() {
    let options = Options {
        raw: true,
        ..Options::default()
    };
    assert_eq!(render(Some(&Node::from("hi there")), "", options), "hi there\n");
}

#[test]
fn test_label_delimiter_substitution() {
    let options = Options {
        show_keys: true,
        ..Options::default()
    }
    .with_shellvars();
    let sink = Sink::new(Vec::new(), options);
    assert_eq!(sink.label("", ".a.b.c"), "a_b_c");
    assert_eq!(sink.label("a.b", ".c"), "a_b_c");
    assert_eq!(sink.label("", ""), "");
}

#[test]
fn test_custom_input_delimiter() {
    let options = Options {
        show_keys: true,
        ..Options::default()
    }
    .with_delimiter('/');
    let out = render(Some(&Node::Integer(1)), "/a/b", options);
    assert_eq!(out, "a/b=1\n");
}

#[test]
fn test_structured_json() {
    let options = Options::default().with_format(OutputFormat::JsonCompact);
    let out = render(Some(&sample()), "", options);
    assert_eq!(out, "{\"name\":\"web\",\"server\":{\"port\":80},\"tags\":[\"a\",\"b\"]}\n");
}

#[test]
fn test_structured_with_key_prefix() {
    let options = Options {
        show_keys: true,
        ..Options::default()
    }
    .with_format(OutputFormat::JsonCompact);
    let out = render(Some(&Node::Array(vec![Node::Integer(1)])), ".list", options);
    assert_eq!(out, "list=[1]\n");
}

#[test]
fn test_yaml_gets_single_newline() {
    let options = Options::default().with_format(OutputFormat::Yaml);
    let out = render(Some(&Node::Integer(5)), "", options);
    assert_eq!(out, "5\n");
}

#[test]
fn test_msgpack_has_no_newline() {
    let options = Options::default().with_format(OutputFormat::Msgpack);
    let out = {
        let mut sink = Sink::new(Vec::new(), options);
        sink.render(Some(&Node::Integer(1)), "", "").unwrap();
        sink.finish().unwrap();
        sink.into_inner()
    };
    assert_eq!(out, vec![0x01]);
}

#[test]
fn test_json_pretty() {
    let out = to_json_pretty(&sample()).unwrap();
    assert!(out.starts_with("{\n  \"name\": \"web\","));
}

#[test]
fn test_yaml_round_trips() {
    let yaml = to_yaml(&sample()).unwrap();
    let doc = Document::parse(&yaml, "yaml", &ParseOptions::default()).unwrap();
    assert_eq!(doc.root, sample());
}

#[test]
fn test_config_text() {
    let expected = "\
name = \"web\";
server {
    port = 80;
}
tags [
    \"a\",
    \"b\",
]
";
    assert_eq!(to_config(&sample()), expected);
}

#[test]
fn test_config_quotes_odd_keys_and_keeps_float_point() {
    let mut obj = Object::new();
    obj.insert("with space", Node::Float(2.0));
    assert_eq!(to_config(&Node::Object(obj)), "\"with space\" = 2.0;\n");
}

#[test]
fn test_timestamp_and_userdata_serialization() {
    let mut obj = Object::new();
    obj.insert("t", Node::Timestamp(1.5));
    obj.insert("u", Node::Userdata("ptr".into()));
    assert_eq!(to_json(&Node::Object(obj)).unwrap(), r#"{"t":1.5,"u":null}"#);
}

#[test]
fn test_emit_text_is_config() {
    let bytes = emit::emit(&sample(), OutputFormat::Text).unwrap();
    assert_eq!(String::from_utf8(bytes).unwrap(), to_config(&sample()));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Rendering the same node twice gives identical bytes.
    #[test]
    fn prop_render_idempotent(n in any::<i64>(), s in "[a-zA-Z0-9 ]{0,12}", keys in any::<bool>()) {
        let mut obj = Object::new();
        obj.insert("n", Node::Integer(n));
        obj.insert("s", Node::String(s));
        let node = Node::Object(obj);
        let options = Options { show_keys: keys, ..Options::default() };

        for format in [OutputFormat::Text, OutputFormat::Json, OutputFormat::Yaml, OutputFormat::Config] {
            let first = render(Some(&node), ".x", options.clone().with_format(format));
            let second = render(Some(&node), ".x", options.clone().with_format(format));
            prop_assert_eq!(first, second);
        }
    }
}
