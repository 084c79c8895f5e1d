use handsynth::params::DesignerParams;

fn main() {
    let params = DesignerParams::default();
    println!(
        "{}",
        serde_json::to_string_pretty(&params).expect("parameters serialize to json")
    );
}
