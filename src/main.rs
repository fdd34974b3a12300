fn main() {
    if let Err(err) = pomo_lib::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
