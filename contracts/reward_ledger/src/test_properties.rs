use proptest::prelude::*;
use proptest_derive::Arbitrary;
use soroban_sdk::testutils::{Address as _, Ledger};
use soroban_sdk::{token, Address, Env};
use std::vec::Vec;

use crate::*;

const STAKERS: usize = 3;
const START: u64 = 10_000;

#[derive(Arbitrary, Clone, Debug)]
enum Op {
    Stake {
        #[proptest(strategy = "0..STAKERS")]
        who: usize,
        #[proptest(strategy = "1i128..5_000")]
        amount: i128,
    },
    Withdraw {
        #[proptest(strategy = "0..STAKERS")]
        who: usize,
        #[proptest(strategy = "1i128..5_000")]
        amount: i128,
    },
    Claim {
        #[proptest(strategy = "0..STAKERS")]
        who: usize,
    },
    Exit {
        #[proptest(strategy = "0..STAKERS")]
        who: usize,
    },
    Fund {
        #[proptest(strategy = "0i128..100_000")]
        amount: i128,
    },
    Warp {
        #[proptest(strategy = "0u64..120")]
        seconds: u64,
    },
}

struct Harness<'a> {
    env: Env,
    client: RewardLedgerContractClient<'a>,
    controller: Address,
    reward_admin: token::StellarAssetClient<'a>,
    stakers: Vec<Address>,
    funded: i128,
    claimed: i128,
}

impl Harness<'_> {
    fn new() -> Self {
        let env = Env::default();
        env.mock_all_auths();
        env.ledger().set_timestamp(START);

        let issuer = Address::generate(&env);
        let stake_sac = env.register_stellar_asset_contract_v2(issuer.clone());
        let reward_sac = env.register_stellar_asset_contract_v2(issuer);

        let contract_id = env.register(RewardLedgerContract, ());
        let client = RewardLedgerContractClient::new(&env, &contract_id);
        let controller = Address::generate(&env);
        client.initialize(&controller, &stake_sac.address(), &reward_sac.address(), &60);

        let stake_admin = token::StellarAssetClient::new(&env, &stake_sac.address());
        let reward_admin = token::StellarAssetClient::new(&env, &reward_sac.address());

        let mut stakers = Vec::new();
        for _ in 0..STAKERS {
            let staker = Address::generate(&env);
            stake_admin.mint(&staker, &1_000_000);
            stakers.push(staker);
        }

        Harness {
            env,
            client,
            controller,
            reward_admin,
            stakers,
            funded: 0,
            claimed: 0,
        }
    }

    /// Apply `op`, ignoring rejected operations; a rejection must leave no
    /// trace, which the invariant checks catch if it does.
    fn apply(&mut self, op: &Op) {
        match *op {
            Op::Stake { who, amount } => {
                let _ = self.client.try_stake(&self.stakers[who], &amount);
            }
            Op::Withdraw { who, amount } => {
                let _ = self.client.try_withdraw(&self.stakers[who], &amount);
            }
            Op::Claim { who } => {
                if let Ok(Ok(paid)) = self.client.try_claim(&self.stakers[who]) {
                    self.claimed += paid;
                }
            }
            Op::Exit { who } => {
                if let Ok(Ok(paid)) = self.client.try_exit(&self.stakers[who]) {
                    self.claimed += paid;
                }
            }
            Op::Fund { amount } => {
                self.reward_admin.mint(&self.client.address, &amount);
                if let Ok(Ok(())) = self
                    .client
                    .try_notify_reward_amount(&self.controller, &amount)
                {
                    self.funded += amount;
                }
            }
            Op::Warp { seconds } => {
                let now = self.env.ledger().timestamp();
                self.env.ledger().set_timestamp(now + seconds);
            }
        }
    }

    fn sum_of_balances(&self) -> i128 {
        self.stakers.iter().map(|s| self.client.balance_of(s)).sum()
    }

    fn outstanding(&self) -> i128 {
        self.stakers.iter().map(|s| self.client.earned(s)).sum()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn ledger_invariants_hold(ops in prop::collection::vec(any::<Op>(), 1..40)) {
        let mut h = Harness::new();
        let mut last_rpt = 0i128;

        for op in &ops {
            h.apply(op);

            prop_assert_eq!(h.client.total_staked(), h.sum_of_balances());

            let rpt = h.client.reward_per_token_stored();
            prop_assert!(rpt >= last_rpt, "accumulator went backwards on {:?}", op);
            last_rpt = rpt;

            prop_assert!(
                h.claimed + h.outstanding() <= h.funded,
                "paid {} + owed {} exceeds funded {}",
                h.claimed,
                h.outstanding(),
                h.funded
            );
            prop_assert!(h.client.reward_committed() >= h.outstanding());
        }
    }

    #[test]
    fn earned_view_matches_claim(
        ops in prop::collection::vec(any::<Op>(), 1..30),
        who in 0..STAKERS,
    ) {
        let mut h = Harness::new();
        for op in &ops {
            h.apply(op);
        }

        let staker = h.stakers[who].clone();
        let expected = h.client.earned(&staker);
        prop_assert_eq!(h.client.claim(&staker), expected);
        prop_assert_eq!(h.client.earned(&staker), 0);
    }
}
