fn main() {
    println!("cargo:rerun-if-changed=tauri.conf.json");

    // デスクトップシェルを含むビルドのみTauriのコード生成を行う
    #[cfg(feature = "desktop")]
    tauri_build::build()
}
