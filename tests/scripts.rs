use pretty_assertions::assert_eq;
use smartscript::{parse, render, Engine, EngineOptions, RenderContext};

#[test]
fn fibonacci_with_transient_parameters() {
    let template = r#"{$= "text/plain" @setMimeType $}First 10 Fibonacci numbers:
{$= "0" "a" @tparamSet "1" "b" @tparamSet $}0, 1{$FOR i 3 10 $}, {$=
  "a" "0" @tparamGet "b" "0" @tparamGet + @dup
  "b" "0" @tparamGet "a" @tparamSet
  "b" @tparamSet
$}{$END$}
"#;
    let mut ctx = RenderContext::buffered();
    render(template, &mut ctx).unwrap();
    assert_eq!(
        ctx.output(),
        "First 10 Fibonacci numbers:\n0, 1, 1, 2, 3, 5, 8, 13, 21, 34\n"
    );
    assert_eq!(ctx.mime_type(), "text/plain");
    assert_eq!(ctx.transient_parameters().get("b").map(String::as_str), Some("34"));
}

#[test]
fn visit_counter_across_requests() {
    let template = r#"{$= "count" "0" @pparamGet 1 + @dup "count" @pparamSet $} visit(s)"#;
    let document = parse(template).unwrap();

    let mut persistent = None;
    let mut outputs = Vec::new();
    for _ in 0..3 {
        let mut ctx = RenderContext::buffered();
        if let Some(count) = persistent.take() {
            ctx = ctx.with_persistent_parameter("count", count);
        }
        Engine::new(&document, &mut ctx).execute().unwrap();
        outputs.push(ctx.output());
        persistent = ctx.persistent_parameters().get("count").cloned();
    }
    assert_eq!(outputs, ["1 visit(s)", "2 visit(s)", "3 visit(s)"]);
}

#[test]
fn multiplication_table_with_nested_loops() {
    let template = "{$FOR row 1 3 $}{$FOR col 1 3 $}{$= row col * \"000\" @decfmt $} {$END$}\n{$END$}";
    let document = parse(template).unwrap();
    let mut ctx = RenderContext::buffered();
    Engine::new(&document, &mut ctx)
        .with_options(EngineOptions::new().max_loop_iterations(100))
        .execute()
        .unwrap();
    assert_eq!(ctx.output(), "001 002 003 \n002 004 006 \n003 006 009 \n");
}

#[test]
fn reconstructed_source_renders_identically() {
    let template = "Sum: {$FOR i 1 4 $}{$= i \"-\" $}{$END$} \\{done\\}";
    let document = parse(template).unwrap();
    let reconstructed = document.to_string();

    let mut original = RenderContext::buffered();
    let mut copy = RenderContext::buffered();
    render(template, &mut original).unwrap();
    render(&reconstructed, &mut copy).unwrap();
    assert_eq!(original.output(), "Sum: 1-2-3-4- {done}");
    assert_eq!(copy.output(), original.output());
}
