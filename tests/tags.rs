use tincture::{value, Engine, Registers, Value};

fn render(source: &str, data: Value) -> String {
    Engine::new()
        .compile(source)
        .unwrap()
        .render_from(&data)
        .to_string()
        .unwrap()
}

#[test]
fn render_if_elsif_else() {
    let source = "{% if a %}A{% elsif b %}B{% else %}C{% endif %}";
    assert_eq!(render(source, value! { a: true, b: true }), "A");
    assert_eq!(render(source, value! { a: false, b: true }), "B");
    assert_eq!(render(source, value! { a: false, b: false }), "C");
}

#[test]
fn render_if_comparisons() {
    let source = "{% if x > 1 %}a{% endif %}{% if x == 2 %}b{% endif %}{% if x != 2 %}c{% endif %}";
    assert_eq!(render(source, value! { x: 2 }), "ab");
    assert_eq!(render(source, value! { x: 1 }), "c");
}

#[test]
fn render_if_contains() {
    let source = "{% if s contains 'b' %}s{% endif %}{% if l contains 2 %}l{% endif %}";
    assert_eq!(render(source, value! { s: "abc", l: [1, 2] }), "sl");
    assert_eq!(render(source, value! { s: "xyz", l: [1] }), "");
}

#[test]
fn render_if_and_or_left_to_right() {
    let source = "{% if true or false and false %}y{% else %}n{% endif %}";
    assert_eq!(render(source, Value::None), "n");
    let source = "{% if false and false or true %}y{% else %}n{% endif %}";
    assert_eq!(render(source, Value::None), "y");
}

#[test]
fn render_if_blank_and_empty() {
    let source = "{% if s == empty %}e{% endif %}{% if s == blank %}b{% endif %}";
    assert_eq!(render(source, value! { s: "" }), "eb");
    assert_eq!(render(source, value! { s: "x" }), "");
}

#[test]
fn render_if_comparison_error() {
    let result = render("a{% if 1 < 'x' %}b{% endif %}c", Value::None);
    assert_eq!(result, "aerror (line 1): comparison of integer with string failedc");
}

#[test]
fn render_unless() {
    let source = "{% unless a %}A{% elsif b %}B{% else %}C{% endunless %}";
    assert_eq!(render(source, value! { a: false, b: false }), "A");
    assert_eq!(render(source, value! { a: true, b: true }), "B");
    assert_eq!(render(source, value! { a: true, b: false }), "C");
}

#[test]
fn render_case() {
    let source = "{% case x %}{% when 1 %}A{% when 2, 3 %}B{% else %}C{% endcase %}";
    assert_eq!(render(source, value! { x: 1 }), "A");
    assert_eq!(render(source, value! { x: 3 }), "B");
    assert_eq!(render(source, value! { x: 4 }), "C");
}

#[test]
fn render_case_multiple_matches() {
    let source = "{% case x %}{% when 1 %}A{% when 1 or 2 %}B{% when 3 %}C{% endcase %}";
    assert_eq!(render(source, value! { x: 1 }), "AB");
}

#[test]
fn render_case_ignores_content_before_when() {
    let source = "{% case x %}ignored{% when 'a' %}A{% endcase %}";
    assert_eq!(render(source, value! { x: "a" }), "A");
}

#[test]
fn render_for() {
    let source = "{% for i in list %}{{ i }},{% endfor %}";
    assert_eq!(render(source, value! { list: ["a", "b", "c"] }), "a,b,c,");
}

#[test]
fn render_for_range_and_reversed() {
    assert_eq!(render("{% for i in (1..4) %}{{ i }}{% endfor %}", Value::None), "1234");
    assert_eq!(
        render("{% for i in (1..n) reversed %}{{ i }}{% endfor %}", value! { n: 3 }),
        "321"
    );
}

#[test]
fn render_for_limit_and_offset() {
    let source = "{% for i in (1..10) limit: 3 offset: 2 %}{{ i }}{% endfor %}";
    assert_eq!(render(source, Value::None), "345");
}

#[test]
fn render_for_else() {
    let source = "{% for i in list %}{{ i }}{% else %}none{% endfor %}";
    assert_eq!(render(source, value! { list: [] }), "none");
    assert_eq!(render(source, Value::None), "none");
    assert_eq!(render(source, value! { list: [1] }), "1");
}

#[test]
fn render_for_string_is_one_item() {
    let source = "{% for c in s %}[{{ c }}]{% endfor %}";
    assert_eq!(render(source, value! { s: "abc" }), "[abc]");
}

#[test]
fn render_forloop() {
    let source = "{% for i in (1..3) %}{{ forloop.index }}{{ forloop.rindex0 }}{{ forloop.first }}{{ forloop.last }},{% endfor %}";
    assert_eq!(render(source, Value::None), "12truefalse,21falsefalse,30falsetrue,");
}

#[test]
fn render_forloop_parentloop() {
    let source = "{% for a in (1..2) %}{% for b in (1..2) %}{{ forloop.parentloop.index }}{{ b }} {% endfor %}{% endfor %}";
    assert_eq!(render(source, Value::None), "11 12 21 22 ");
}

#[test]
fn render_for_variable_is_scoped() {
    let source = "{% for i in (1..2) %}{% endfor %}[{{ i }}{{ forloop.index }}]";
    assert_eq!(render(source, Value::None), "[]");
}

#[test]
fn render_for_break() {
    let source = "{% for i in (1..5) %}{% if i == 3 %}{% break %}{% endif %}{{ i }}{% endfor %}";
    assert_eq!(render(source, Value::None), "12");
}

#[test]
fn render_for_continue() {
    let source = "{% for i in (1..5) %}{% if i == 3 %}{% continue %}{% endif %}{{ i }}{% endfor %}";
    assert_eq!(render(source, Value::None), "1245");
}

#[test]
fn render_for_break_inner_loop_only() {
    let source = "{% for a in (1..2) %}{% for b in (1..3) %}{% if b == 2 %}{% break %}{% endif %}{{ a }}{{ b }} {% endfor %}{% endfor %}";
    assert_eq!(render(source, Value::None), "11 21 ");
}

#[test]
fn render_for_offset_continue() {
    let engine = Engine::new();
    let template = engine
        .compile("{% for i in list limit: 2 offset: continue %}{{ i }}{% endfor %}")
        .unwrap();
    let data = value! { list: [1, 2, 3, 4, 5] };
    let mut registers = Registers::new();
    let first = template
        .render_from(&data)
        .with_registers(&mut registers)
        .to_string()
        .unwrap();
    let second = template
        .render_from(&data)
        .with_registers(&mut registers)
        .to_string()
        .unwrap();
    assert_eq!(first, "12");
    assert_eq!(second, "34");
}

#[test]
fn render_for_offset_continue_within_template() {
    let source = "{% for i in list limit: 2 %}{{ i }}{% endfor %};{% for i in list offset: continue %}{{ i }}{% endfor %}";
    assert_eq!(render(source, value! { list: [1, 2, 3, 4] }), "12;34");
}

#[test]
fn render_tablerow() {
    let source = "{% tablerow i in (1..3) cols: 2 %}{{ i }}{% endtablerow %}";
    assert_eq!(
        render(source, Value::None),
        "<tr class=\"row1\">\n<td class=\"col1\">1</td><td class=\"col2\">2</td></tr>\n<tr class=\"row2\"><td class=\"col1\">3</td></tr>\n"
    );
}

#[test]
fn render_tablerowloop() {
    let source = "{% tablerow i in list cols: 2 %}{{ tablerowloop.row }}{{ tablerowloop.col_last }}{% endtablerow %}";
    assert_eq!(
        render(source, value! { list: ["a", "b"] }),
        "<tr class=\"row1\">\n<td class=\"col1\">1false</td><td class=\"col2\">1true</td></tr>\n"
    );
}

#[test]
fn render_assign() {
    let source = "{% assign x = 'a' | upcase %}{{ x }}";
    assert_eq!(render(source, Value::None), "A");
}

#[test]
fn render_assign_escapes_blocks() {
    let source = "{% if true %}{% assign x = 1 %}{% endif %}{% for i in (1..2) %}{% assign y = i %}{% endfor %}{{ x }}{{ y }}";
    assert_eq!(render(source, Value::None), "12");
}

#[test]
fn render_assign_shadows_data() {
    let source = "{{ x }}{% assign x = 'b' %}{{ x }}";
    assert_eq!(render(source, value! { x: "a" }), "ab");
}

#[test]
fn render_capture() {
    let source = "{% capture x %}a{{ 1 | plus: 2 }}{% endcapture %}[{{ x }}]";
    assert_eq!(render(source, Value::None), "[a3]");
}

#[test]
fn render_comment() {
    let source = "a{% comment %}b{{ c }}{% ipsum %}{% endcomment %}c";
    assert_eq!(render(source, Value::None), "ac");
}

#[test]
fn render_raw() {
    let source = "{% raw %}{{ x }}{% if y %}{% endraw %}";
    assert_eq!(render(source, value! { x: 1 }), "{{ x }}{% if y %}");
}

#[test]
fn render_raw_whitespace_control() {
    let source = "a {%- raw -%} b {%- endraw -%} c";
    assert_eq!(render(source, Value::None), "abc");
}

#[test]
fn render_for_serialized_range() {
    let result = Engine::new()
        .compile("{% for i in r %}{{ i }}{% endfor %} {{ r.size }}")
        .unwrap()
        .render(value! { r: (1..=3) })
        .to_string()
        .unwrap();
    assert_eq!(result, "123 3");
}

#[test]
fn render_cycle() {
    let source = "{% for i in (1..4) %}{% cycle 'a', 'b', 'c' %}{% endfor %}";
    assert_eq!(render(source, Value::None), "abca");
}

#[test]
fn render_cycle_groups() {
    let source = "{% cycle 'g': 'a', 'b' %}{% cycle 'g': 'a', 'b' %}{% cycle 'a', 'b' %}{% cycle 'h': 'a', 'b' %}";
    assert_eq!(render(source, Value::None), "abaa");
}

#[test]
fn render_cycle_group_of_different_lengths() {
    let long = "{% cycle 'g': 'a', 'b', 'c' %}";
    let short = "{% cycle 'g': 'x', 'y' %}";
    let source = format!("{long}{long}{short}|{long}{short}{short}");
    assert_eq!(render(&source, Value::None), "ab|ayx");
}

#[test]
fn render_ifchanged() {
    let source = "{% for i in list %}{% ifchanged %}{{ i }}{% endifchanged %}{% endfor %}";
    assert_eq!(render(source, value! { list: [1, 1, 2, 2, 1] }), "121");
}

#[test]
fn render_nested_blocks_blank_whitespace() {
    let source = "{% if true %}  {% assign x = 1 %}  {% endif %}{{ x }}";
    assert_eq!(render(source, Value::None), "1");
}
