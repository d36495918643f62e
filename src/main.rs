fn main() {
    if let Err(err) = seatmap::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
