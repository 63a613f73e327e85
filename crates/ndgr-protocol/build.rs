fn main() {
    prost_build::compile_protos(&["proto/ndgr.proto"], &["proto/"]).expect("compile ndgr.proto");
}
