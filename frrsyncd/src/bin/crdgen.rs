use kube::CustomResourceExt;
use frrsyncd_kubernetes::crd;

fn main() {
    print!(
        "{}",
        serde_yaml::to_string(&crd::routing_config::RoutingConfig::crd()).unwrap()
    );
}
