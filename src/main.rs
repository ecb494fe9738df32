fn main() {
    if let Err(err) = judstop_lib::run() {
        eprintln!("judstop failed: {err:#}");
        std::process::exit(1);
    }
}
