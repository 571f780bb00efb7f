use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Only regenerate if the proto file changes
    println!("cargo:rerun-if-changed=src/proto/prediction.proto");

    // Use the vendored protoc so builds don't depend on a system install
    let protoc = protoc_bin_vendored::protoc_bin_path()?;
    std::env::set_var("PROTOC", protoc);
    let well_known = protoc_bin_vendored::include_path()?;

    // Clients are used by the dispatcher, servers by the integration tests' mock nodes
    tonic_prost_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(
            &[PathBuf::from("src/proto/prediction.proto")],
            &[PathBuf::from("src/proto"), well_known],
        )?;

    println!("cargo:info=Protobuf compilation completed successfully");

    Ok(())
}
