use proc_macro::{Delimiter, Group, TokenStream, TokenTree};

/// Runs a function body on a fresh Strand event loop.
///
/// The body executes with the loop installed as the current loop, so it
/// can call `strand::queue_work`, `strand::set_timeout` and
/// `strand::hooks`. The loop then runs until nothing is pending. A
/// callback panic makes the function panic with the loop's error.
///
/// The body's value is returned once the loop is done, so the function
/// may return a `Result`.
///
/// Accepts an optional `worker_threads = N` argument.
///
/// ```rust,ignore
/// #[strand::main(worker_threads = 2)]
/// fn main() {
///     strand::queue_work("Nebula::Example::Job", || Ok::<_, strand::BoxError>(()), |_| {}).unwrap();
/// }
/// ```
#[proc_macro_attribute]
pub fn main(attr: TokenStream, item: TokenStream) -> TokenStream {
    wrap_body(attr, item, false)
}

/// Same as [`main`], for `#[test]` functions.
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    wrap_body(attr, item, true)
}

fn wrap_body(attr: TokenStream, item: TokenStream, is_test: bool) -> TokenStream {
    let mut tokens: Vec<TokenTree> = item.into_iter().collect();

    let worker_threads = match parse_worker_threads(&attr.to_string()) {
        Ok(n) => n,
        Err(msg) => return compile_error(&msg),
    };

    let Some(pos) = tokens.iter().rposition(
        |t| matches!(t, TokenTree::Group(g) if g.delimiter() == Delimiter::Brace),
    ) else {
        return compile_error("expected a function body");
    };

    let block = match &tokens[pos] {
        TokenTree::Group(g) => g.stream().to_string(),
        _ => unreachable!(),
    };

    let mut builder = String::from("::strand::LoopBuilder::new()");

    if let Some(n) = worker_threads {
        builder.push_str(&format!(".worker_threads({n})"));
    }

    builder.push_str(".build()");

    let new_block = format!(
        "{{
            let event_loop = {builder}.expect(\"failed to build the event loop\");
            let output = event_loop.enter(|| {{ {block} }});
            if let ::core::result::Result::Err(err) = event_loop.run() {{
                ::core::panic!(\"event loop failed: {{}}\", err);
            }}
            output
        }}"
    );

    let new_block = match new_block.parse::<TokenStream>() {
        Ok(ts) => ts,
        Err(err) => return compile_error(&format!("strand macro error: {err}")),
    };

    tokens[pos] = TokenTree::Group(Group::new(Delimiter::Brace, new_block));

    let mut result: Vec<TokenTree> = Vec::new();

    if is_test {
        let test_attr: TokenStream = "#[::core::prelude::v1::test]"
            .parse()
            .unwrap_or_default();
        result.extend(test_attr);
    }

    result.extend(tokens);
    result.into_iter().collect()
}

/// Parses the optional `worker_threads = N` attribute argument.
fn parse_worker_threads(attr: &str) -> Result<Option<usize>, String> {
    let mut worker_threads = None;

    for part in attr.split(',') {
        let part = part.trim();

        if part.is_empty() {
            continue;
        }

        let Some(value) = part.strip_prefix("worker_threads") else {
            return Err(format!("unknown argument `{part}`"));
        };

        let value = value.trim_start().trim_start_matches('=').trim();

        match value.parse::<usize>() {
            Ok(0) | Err(_) => {
                return Err(format!("worker_threads must be a positive integer, got `{value}`"));
            }
            Ok(n) => worker_threads = Some(n),
        }
    }

    Ok(worker_threads)
}

fn compile_error(msg: &str) -> TokenStream {
    format!("compile_error!({msg:?});")
        .parse()
        .unwrap_or_default()
}
