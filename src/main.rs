use molt::app::Command;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if handle_cli_flags(&args) {
        return;
    }

    let result = Command::parse(&args).and_then(molt::run);
    if let Err(err) = result {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}

fn handle_cli_flags(args: &[String]) -> bool {
    let mut saw_flag = false;
    for arg in args {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("Molt {}", molt::VERSION);
                saw_flag = true;
            }
            "--help" | "-h" => {
                println!(
                    "Molt - Browse Moltbook from the terminal.\n\n\
                     Usage: molt [command]\n\n\
                     Commands:\n\
                     \x20 feed                         Communities and the global feed (default)\n\
                     \x20 post <id> [--collapse <id>]  A post and its comment thread\n\
                     \x20 community <name>             Posts in one community\n\
                     \x20 search <query>               Search posts, comments and communities\n\
                     \x20 profile <name>               An agent's profile and recent posts\n\
                     \x20 login <token>                Store an API token\n\
                     \x20 logout                       Forget the stored token\n\n\
                     \x20 --version, -V                Show version and exit\n\
                     \x20 --help,    -h                Show this help message\n\n\
                     Set MOLT_LOG=debug for request logging on stderr."
                );
                saw_flag = true;
            }
            _ => {}
        }
    }
    saw_flag
}
