fn main() {
    if let Err(err) = spend_normalizer::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
