use tincture::{value, Engine, ErrorKind, ResourceLimits, Value};

#[test]
fn render_length_under_limit() {
    let result = Engine::new()
        .compile("{{ x }}")
        .unwrap()
        .render(value! { x: "abcde" })
        .with_limits(ResourceLimits::new().with_render_length_limit(5))
        .to_string()
        .unwrap();
    assert_eq!(result, "abcde");
}

#[test]
fn render_length_over_limit() {
    let err = Engine::new()
        .compile("{{ x }}")
        .unwrap()
        .render(value! { x: "abcdef" })
        .with_limits(ResourceLimits::new().with_render_length_limit(5))
        .to_string()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Memory);
    assert_eq!(err.to_string(), "error: memory limits exceeded");
}

#[test]
fn render_length_counts_nested_output_at_each_level() {
    let engine = Engine::new();
    let template = engine
        .compile("{% if true %}{% if true %}aaaa{% endif %}{% endif %}")
        .unwrap();
    let result = template
        .render_from(&Value::None)
        .with_limits(ResourceLimits::new().with_render_length_limit(12))
        .to_string()
        .unwrap();
    assert_eq!(result, "aaaa");
    let err = template
        .render_from(&Value::None)
        .with_limits(ResourceLimits::new().with_render_length_limit(10))
        .to_string()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Memory);
}

#[test]
fn render_length_over_limit_in_loop() {
    let err = Engine::new()
        .compile("{% for i in (1..100) %}xx{% endfor %}")
        .unwrap()
        .render_from(&Value::None)
        .with_limits(ResourceLimits::new().with_render_length_limit(50))
        .to_string()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Memory);
}

#[test]
fn huge_range_loop_with_break() {
    let result = Engine::new()
        .compile("{% for x in (1..9000000000000000000) %}{{ x }}{% break %}{% endfor %}")
        .unwrap()
        .render_from(&Value::None)
        .with_limits(
            ResourceLimits::new()
                .with_render_score_limit(10)
                .with_render_length_limit(10),
        )
        .to_string()
        .unwrap();
    assert_eq!(result, "1");
}

#[test]
fn huge_range_loop_hits_limit() {
    let err = Engine::new()
        .compile("{% for x in (1..9000000000000000000) %}x{% endfor %}")
        .unwrap()
        .render_from(&Value::None)
        .with_limits(ResourceLimits::new().with_render_score_limit(100))
        .to_string()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Memory);
}

#[test]
fn huge_range_loop_with_empty_body() {
    let result = Engine::new()
        .compile("a{% for x in (1..9000000000000000000) %}{% endfor %}b")
        .unwrap()
        .render_from(&Value::None)
        .to_string()
        .unwrap();
    assert_eq!(result, "ab");
}

#[test]
fn extreme_range_loop() {
    let result = Engine::new()
        .compile(
            "{% for x in (-9000000000000000000..9000000000000000000) limit:1 %}{{ x }};{% endfor %}\
             {% for x in (9223372036854775806..9223372036854775807) reversed %}{{ x }};{% endfor %}",
        )
        .unwrap()
        .render_from(&Value::None)
        .to_string()
        .unwrap();
    assert_eq!(
        result,
        "-9000000000000000000;9223372036854775807;9223372036854775806;"
    );
}

#[test]
fn extreme_range_size() {
    let result = Engine::new()
        .compile("{% assign r = (-9000000000000000000..9000000000000000000) %}{{ r.size }}")
        .unwrap()
        .render_from(&Value::None)
        .to_string()
        .unwrap();
    assert_eq!(result, i64::MAX.to_string());
}

#[test]
fn huge_range_tablerow_hits_limit() {
    let err = Engine::new()
        .compile("{% tablerow x in (1..9000000000000000000) %}{% endtablerow %}")
        .unwrap()
        .render_from(&Value::None)
        .with_limits(ResourceLimits::new().with_render_length_limit(1000))
        .to_string()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Memory);
}

#[test]
fn render_score_over_limit() {
    let engine = Engine::new();
    let template = engine
        .compile("{% for i in (1..10) %}x{% endfor %}")
        .unwrap();
    template
        .render_from(&Value::None)
        .with_limits(ResourceLimits::new().with_render_score_limit(11))
        .to_string()
        .unwrap();
    let err = template
        .render_from(&Value::None)
        .with_limits(ResourceLimits::new().with_render_score_limit(10))
        .to_string()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Memory);
}

#[test]
fn assign_score_over_limit() {
    let engine = Engine::new();
    let template = engine.compile("{% assign x = s %}").unwrap();
    template
        .render(value! { s: "abcd" })
        .with_limits(ResourceLimits::new().with_assign_score_limit(4))
        .to_string()
        .unwrap();
    let err = template
        .render(value! { s: "abcde" })
        .with_limits(ResourceLimits::new().with_assign_score_limit(4))
        .to_string()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Memory);
}

#[test]
fn assign_score_counts_collections() {
    let engine = Engine::new();
    let template = engine.compile("{% assign x = l %}").unwrap();
    let err = template
        .render(value! { l: ["ab", "cd"] })
        .with_limits(ResourceLimits::new().with_assign_score_limit(4))
        .to_string()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Memory);
}

#[test]
fn capture_score_over_limit() {
    let err = Engine::new()
        .compile("{% capture x %}{% for i in (1..10) %}ab{% endfor %}{% endcapture %}")
        .unwrap()
        .render_from(&Value::None)
        .with_limits(ResourceLimits::new().with_assign_score_limit(10))
        .to_string()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Memory);
}

#[test]
fn memory_error_is_not_substituted() {
    let mut errors = Vec::new();
    let result = Engine::new()
        .compile("a{{ x }}")
        .unwrap()
        .render(value! { x: "abcdef" })
        .with_limits(ResourceLimits::new().with_render_length_limit(3))
        .with_errors(&mut errors)
        .to_string();
    assert!(result.is_err());
    assert!(errors.is_empty());
}

#[test]
fn scope_stack_too_deep() {
    let source = format!("{}x{}", "{% if true %}".repeat(100), "{% endif %}".repeat(100));
    let mut engine = Engine::new();
    engine.set_max_depth(200);
    let result = engine
        .compile(&source)
        .unwrap()
        .render_from(&Value::None)
        .with_rethrow(true)
        .to_string()
        .unwrap_err();
    assert_eq!(result.kind(), ErrorKind::StackLevel);
}
