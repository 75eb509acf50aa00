fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match ezr_core::runtime::parse_cli_args(&args) {
        Ok(options) => options,
        Err(error) => {
            eprintln!("[ezr-core] {error}");
            std::process::exit(2);
        }
    };

    if let Err(error) = ezr_core::runtime::run_with_options(options) {
        eprintln!("[ezr-core] runtime failed: {error}");
        std::process::exit(1);
    }
}
