fn main() {
    if let Err(err) = veritas::cli::main() {
        eprintln!("❌ {err}");
        std::process::exit(1);
    }
}
