fn main() {
    let allow_missing_icon = std::env::var("EZR_ALLOW_MISSING_ICON")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os != "windows" {
        return;
    }

    let icon_path = "../assets/ezr.ico";
    println!("cargo:rerun-if-changed={icon_path}");
    if !std::path::Path::new(icon_path).exists() {
        if !allow_missing_icon {
            println!("cargo:warning=ezr-core: no icon at {icon_path}; set EZR_ALLOW_MISSING_ICON=1 to silence");
        }
        return;
    }

    let mut resource = winres::WindowsResource::new();
    resource.set_icon(icon_path);
    if let Err(error) = resource.compile() {
        println!("cargo:warning=ezr-core: failed to embed Windows resources: {error}");
    }
}
