//! Monkey CLI and REPL
//!
//! Usage:
//!   monkey run <file.mk>      - Execute a Monkey file
//!   monkey repl               - Start interactive REPL
//!   monkey tokens <file.mk>   - Print the token stream of a file
//!   monkey ast <file.mk>      - Print the parsed program in canonical form
//!   monkey help               - Show help message

use std::env;
use std::fs;
use std::process;
use std::thread;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use monkey::token::TokenKind;
use monkey::{Env, Environment, Evaluator, Lexer, Object, ParseErrors, VERSION};

/// Stack for the interpreter thread
const STACK_SIZE: usize = 64 * 1024 * 1024;

/// Evaluation depth the interpreter thread's stack can hold
const MAX_DEPTH: usize = 1024;

fn main() {
    let args: Vec<String> = env::args().collect();

    let worker = thread::Builder::new()
        .name("monkey".to_string())
        .stack_size(STACK_SIZE)
        .spawn(move || dispatch(&args));

    let code = match worker.map(|handle| handle.join()) {
        Ok(Ok(code)) => code,
        Ok(Err(_)) => 101,
        Err(e) => {
            eprintln!("{}: cannot start interpreter thread: {}", "error".red(), e);
            1
        }
    };
    process::exit(code);
}

fn dispatch(args: &[String]) -> i32 {
    if args.len() < 2 {
        print_help();
        return 0;
    }

    match args[1].as_str() {
        "run" | "tokens" | "ast" => {
            let Some(path) = args.get(2) else {
                eprintln!("{}: missing file argument", "error".red());
                eprintln!("Usage: monkey {} <file.mk>", args[1]);
                return 1;
            };
            match args[1].as_str() {
                "run" => run_file(path),
                "tokens" => dump_tokens(path),
                _ => dump_ast(path),
            }
        }
        "repl" => {
            run_repl();
            0
        }
        "help" | "--help" | "-h" => {
            print_help();
            0
        }
        "version" | "--version" | "-v" => {
            println!("Monkey {}", VERSION);
            0
        }
        _ => {
            // Assume it's a file
            if args[1].ends_with(".mk") {
                run_file(&args[1])
            } else {
                eprintln!("{}: unknown command '{}'", "error".red(), args[1]);
                print_help();
                1
            }
        }
    }
}

fn print_help() {
    println!("{}", "Monkey".cyan().bold());
    println!("A small, expression-oriented programming language");
    println!("{} {}\n", "Version".cyan(), VERSION);
    println!("{}", "USAGE:".yellow());
    println!("  monkey run <file.mk>      Execute a Monkey file");
    println!("  monkey repl               Start interactive REPL");
    println!("  monkey tokens <file.mk>   Print the token stream");
    println!("  monkey ast <file.mk>      Print the parsed program");
    println!("  monkey help               Show this help message");
    println!("  monkey version            Show version\n");
    println!("{}", "LANGUAGE FEATURES:".yellow());
    println!("  let x = 10;                      Binding");
    println!("  if (x > 5) {{ x }} else {{ 0 }}      Conditional expression");
    println!("  let add = fn(a, b) {{ a + b }};    Function literal");
    println!("  add(1, 2)                        Call");
}

fn read_source(path: &str) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            eprintln!("{}: cannot read file '{}': {}", "error".red(), path, e);
            None
        }
    }
}

fn report_parse_errors(errors: &ParseErrors) {
    for error in errors.iter() {
        eprintln!("{}", error.to_string().red());
    }
}

fn run_file(path: &str) -> i32 {
    let Some(source) = read_source(path) else {
        return 1;
    };

    let env = Environment::new_env();
    match monkey::run_with(&source, &env, &mut Evaluator::with_max_depth(MAX_DEPTH)) {
        Ok(Object::Error(message)) => {
            eprintln!("{}: {}", "runtime error".red(), message);
            1
        }
        Ok(_) => 0,
        Err(errors) => {
            report_parse_errors(&errors);
            1
        }
    }
}

fn dump_tokens(path: &str) -> i32 {
    let Some(source) = read_source(path) else {
        return 1;
    };

    for token in Lexer::new(&source).tokenize() {
        let line = format!(
            "{:>4}:{:<4} {:<10} {:?}",
            token.span.line, token.span.column, token.kind.to_string(), token.literal
        );
        if token.kind == TokenKind::Illegal {
            println!("{}", line.red());
        } else {
            println!("{}", line);
        }
    }
    0
}

fn dump_ast(path: &str) -> i32 {
    let Some(source) = read_source(path) else {
        return 1;
    };

    let (program, errors) = monkey::parser::parse(Lexer::new(&source));
    if !errors.is_empty() {
        report_parse_errors(&ParseErrors(errors).with_source(&source));
        return 1;
    }

    for stmt in &program.statements {
        println!("{}", stmt);
    }
    0
}

fn run_repl() {
    println!("{} {} - {}",
        "Monkey".cyan().bold(),
        VERSION.cyan(),
        "a tree-walking interpreter".dimmed()
    );
    println!("Type {} to exit, {} for help\n",
        "exit".yellow(),
        "help".yellow()
    );

    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("{}: cannot start line editor: {}", "error".red(), e);
            return;
        }
    };

    // Bindings persist across REPL lines
    let mut env: Env = Environment::new_env();
    let mut evaluator = Evaluator::with_max_depth(MAX_DEPTH);

    loop {
        match rl.readline(&format!("{} ", ">>".green().bold())) {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                match line {
                    "exit" | "quit" => {
                        println!("{}", "Goodbye!".cyan());
                        break;
                    }
                    "help" => {
                        print_repl_help();
                        continue;
                    }
                    "clear" => {
                        env = Environment::new_env();
                        println!("{}", "Environment cleared.".dimmed());
                        continue;
                    }
                    _ => {}
                }

                match monkey::run_with(line, &env, &mut evaluator) {
                    Ok(Object::Error(message)) => {
                        eprintln!("{}", format!("ERROR: {}", message).red());
                    }
                    Ok(Object::Null) => {}
                    Ok(value) => {
                        println!("{} {}", "=>".dimmed(), value.inspect().cyan());
                    }
                    Err(errors) => report_parse_errors(&errors),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".dimmed());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "Goodbye!".cyan());
                break;
            }
            Err(err) => {
                eprintln!("{}: {:?}", "error".red(), err);
                break;
            }
        }
    }
}

fn print_repl_help() {
    println!("{}", "REPL Commands:".yellow());
    println!("  exit, quit   Exit the REPL");
    println!("  clear        Forget all bindings");
    println!("  help         Show this help\n");
    println!("{}", "Language Examples:".yellow());
    println!("  let x = 10;");
    println!("  let double = fn(n) {{ n * 2 }};");
    println!("  double(x)");
    println!("  if (x > 5) {{ true }} else {{ false }}");
}
